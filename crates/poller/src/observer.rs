//! Callbacks invoked by the poller.

use adgen_core::job::{JobKind, JobProgress};
use tokio::sync::broadcast;

use crate::events::JobEvent;
use crate::poller::PollError;

/// Receives progress and the terminal outcome of one polled job.
///
/// All methods default to no-ops. Callbacks are never invoked after
/// the poll has been cancelled.
pub trait PollObserver: Send + Sync {
    /// A non-terminal status was observed. `progress.percentage` never
    /// decreases across calls for the same job.
    fn on_progress(&self, _job_id: &str, _progress: &JobProgress) {}

    /// Called once when the job completes.
    fn on_completed(&self, _job_id: &str, _result: &serde_json::Value) {}

    /// Called once when the job fails or the attempt cap is exhausted.
    fn on_failed(&self, _job_id: &str, _error: &PollError) {}
}

impl PollObserver for () {}

/// Forwards callbacks as [`JobEvent`]s on a broadcast channel.
pub struct BroadcastObserver {
    operation: JobKind,
    tx: broadcast::Sender<JobEvent>,
}

impl BroadcastObserver {
    pub fn new(operation: JobKind, tx: broadcast::Sender<JobEvent>) -> Self {
        Self { operation, tx }
    }

    fn send(&self, event: JobEvent) {
        // No subscribers is fine.
        let _ = self.tx.send(event);
    }
}

impl PollObserver for BroadcastObserver {
    fn on_progress(&self, job_id: &str, progress: &JobProgress) {
        self.send(JobEvent::Progress {
            operation: self.operation,
            job_id: job_id.to_string(),
            percent: progress.percent(),
            current_step: progress.current_step.clone(),
        });
    }

    fn on_completed(&self, job_id: &str, result: &serde_json::Value) {
        self.send(JobEvent::Completed {
            operation: self.operation,
            job_id: job_id.to_string(),
            result: result.clone(),
        });
    }

    fn on_failed(&self, job_id: &str, error: &PollError) {
        self.send(JobEvent::Failed {
            operation: self.operation,
            job_id: job_id.to_string(),
            error: error.to_string(),
            timed_out: matches!(error, PollError::TimedOut { .. }),
        });
    }
}
