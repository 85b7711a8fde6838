//! Fixed-interval job polling with an attempt cap and cooperative
//! cancellation.
//!
//! Each status check is preceded by one [`PollConfig::interval`] delay,
//! so check *n* happens at `n * interval`. When check
//! `max_attempts + 1` comes due the poll fails with
//! [`PollError::TimedOut`] without fetching. Fetch errors are logged and
//! count as an attempt; only a backend `failed` status or the cap end
//! polling with an error.

use std::sync::Arc;

use adgen_core::job::{JobProgress, JobState};
use adgen_core::source::JobStatusSource;
use adgen_core::types::JobId;
use adgen_core::user_message::{user_message, FailureKind};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::PollConfig;
use crate::observer::PollObserver;

/// Ways a poll can end without a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// The backend reported `status: failed`.
    #[error("Job failed: {0}")]
    Failed(String),

    /// The attempt cap was reached before a terminal status.
    #[error("Job did not finish after {attempts} status checks")]
    TimedOut { attempts: u32 },

    /// The poll was cancelled before a terminal status.
    #[error("Polling cancelled")]
    Cancelled,

    /// The polling task panicked or was aborted.
    #[error("Polling task aborted: {0}")]
    Aborted(String),
}

impl PollError {
    /// Message suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            PollError::Failed(msg) => user_message(FailureKind::Backend, msg),
            PollError::TimedOut { .. } => user_message(FailureKind::Timeout, ""),
            PollError::Cancelled => "Stopped waiting for the job.".to_string(),
            PollError::Aborted(_) => user_message(FailureKind::Transient, ""),
        }
    }
}

/// Fallback error when the backend fails a job without a message.
const UNKNOWN_FAILURE: &str = "Job failed without an error message";

/// Poll `job_id` until it reaches a terminal state.
///
/// Resolves with the job's `result` (JSON `null` if the backend sent
/// none). The observer sees progress with a non-decreasing percentage,
/// then exactly one terminal callback. After `cancel` fires no further
/// fetch starts, an in-flight fetch is dropped, and no callback runs.
pub async fn poll_job<S, O>(
    source: &S,
    job_id: &str,
    config: &PollConfig,
    observer: &O,
    cancel: &CancellationToken,
) -> Result<serde_json::Value, PollError>
where
    S: JobStatusSource + ?Sized,
    O: PollObserver + ?Sized,
{
    let mut attempts: u32 = 0;
    let mut best_percent: u8 = 0;
    let mut last_state: Option<JobState> = None;

    tracing::debug!(
        job_id,
        interval_ms = config.interval.as_millis() as u64,
        max_attempts = ?config.max_attempts,
        "Polling job",
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(job_id, attempts, "Polling cancelled");
                return Err(PollError::Cancelled);
            }
            _ = tokio::time::sleep(config.interval) => {}
        }

        if let Some(max) = config.max_attempts {
            if attempts >= max {
                let err = PollError::TimedOut { attempts };
                tracing::warn!(job_id, attempts, "Job polling timed out");
                observer.on_failed(job_id, &err);
                return Err(err);
            }
        }
        attempts += 1;

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(job_id, attempts, "Polling cancelled during status check");
                return Err(PollError::Cancelled);
            }
            result = source.fetch_status(job_id) => result,
        };

        // A fetch can finish on another worker after `cancel` fired.
        if cancel.is_cancelled() {
            tracing::debug!(job_id, attempts, "Polling cancelled, discarding status check");
            return Err(PollError::Cancelled);
        }

        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(job_id, attempt = attempts, error = %e, "Status check failed, retrying");
                continue;
            }
        };

        if let Some(prev) = last_state {
            if let Err(e) = prev.validate_transition(snapshot.status) {
                tracing::warn!(job_id, error = %e, "Unexpected job state transition");
            }
        }
        last_state = Some(snapshot.status);

        match snapshot.status {
            JobState::Queued | JobState::Processing => {
                let reported = snapshot.progress.unwrap_or_default();
                best_percent = best_percent.max(reported.percent());
                let progress = JobProgress::new(f64::from(best_percent), reported.current_step);

                tracing::debug!(
                    job_id,
                    attempt = attempts,
                    status = %snapshot.status,
                    percent = best_percent,
                    step = progress.current_step.as_deref().unwrap_or(""),
                    "Job progress",
                );
                observer.on_progress(job_id, &progress);
            }
            JobState::Completed => {
                let result = snapshot.result.unwrap_or(serde_json::Value::Null);
                tracing::info!(job_id, attempts, "Job completed");
                observer.on_completed(job_id, &result);
                return Ok(result);
            }
            JobState::Failed => {
                let message = snapshot
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_FAILURE.to_string());
                tracing::warn!(job_id, attempts, error = %message, "Job failed");
                let err = PollError::Failed(message);
                observer.on_failed(job_id, &err);
                return Err(err);
            }
        }
    }
}

/// Handle to a poll running on its own task.
#[derive(Debug)]
pub struct PollHandle {
    job_id: JobId,
    cancel: CancellationToken,
    task: JoinHandle<Result<serde_json::Value, PollError>>,
}

impl PollHandle {
    pub(crate) fn new(
        job_id: JobId,
        cancel: CancellationToken,
        task: JoinHandle<Result<serde_json::Value, PollError>>,
    ) -> Self {
        Self {
            job_id,
            cancel,
            task,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stop polling. No fetch starts and no callback fires afterwards.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the poll to end.
    pub async fn join(self) -> Result<serde_json::Value, PollError> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(PollError::Cancelled),
            Err(e) => Err(PollError::Aborted(e.to_string())),
        }
    }
}

/// Run [`poll_job`] on a new tokio task.
pub fn spawn_poll(
    source: Arc<dyn JobStatusSource>,
    job_id: impl Into<JobId>,
    config: PollConfig,
    observer: Arc<dyn PollObserver>,
    cancel: CancellationToken,
) -> PollHandle {
    let job_id = job_id.into();
    let task_job_id = job_id.clone();
    let task_cancel = cancel.clone();

    let task = tokio::spawn(async move {
        poll_job(
            source.as_ref(),
            &task_job_id,
            &config,
            observer.as_ref(),
            &task_cancel,
        )
        .await
    });

    PollHandle::new(job_id, cancel, task)
}
