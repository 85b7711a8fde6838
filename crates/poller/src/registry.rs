//! One poller per logical operation.
//!
//! [`PollerRegistry`] spawns pollers keyed by [`JobKind`]. Starting a
//! poll for a kind that already has one cancels the old poller first,
//! so two pollers never race for the same operation. Lifecycle events
//! from every poller are broadcast on a single channel. Call
//! [`PollerRegistry::subscribe`] to receive them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adgen_core::job::JobKind;
use adgen_core::source::JobStatusSource;
use adgen_core::types::JobId;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::PollConfig;
use crate::events::JobEvent;
use crate::observer::BroadcastObserver;
use crate::poller::{poll_job, PollError, PollHandle};

/// Broadcast channel capacity for job events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long [`PollerRegistry::shutdown`] waits for tasks to exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Bookkeeping for the poller currently serving one kind.
struct ActivePoll {
    /// Distinguishes a poller from the one that replaced it.
    generation: u64,
    job_id: JobId,
    cancel: CancellationToken,
}

type ActiveMap = Arc<Mutex<HashMap<JobKind, ActivePoll>>>;

/// Owns every spawned poller.
pub struct PollerRegistry {
    active: ActiveMap,
    event_tx: broadcast::Sender<JobEvent>,
    /// Master cancellation token, cancelled during shutdown.
    cancel: CancellationToken,
    tracker: TaskTracker,
    next_generation: AtomicU64,
}

impl Default for PollerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PollerRegistry {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            active: Arc::new(Mutex::new(HashMap::new())),
            event_tx,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Subscribe to lifecycle events of every poller.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Start polling `job_id` as the poller for `kind`.
    ///
    /// Any poller already running for `kind` is cancelled and a
    /// [`JobEvent::Cancelled`] is emitted for it.
    pub async fn start(
        &self,
        kind: JobKind,
        job_id: impl Into<JobId>,
        source: Arc<dyn JobStatusSource>,
        config: PollConfig,
    ) -> PollHandle {
        let job_id = job_id.into();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let poll_cancel = self.cancel.child_token();

        {
            let mut active = self.active.lock().await;
            let replaced = active.insert(
                kind,
                ActivePoll {
                    generation,
                    job_id: job_id.clone(),
                    cancel: poll_cancel.clone(),
                },
            );
            if let Some(prev) = replaced {
                tracing::info!(
                    operation = %kind,
                    superseded = %prev.job_id,
                    job_id = %job_id,
                    "Superseding running poller",
                );
                prev.cancel.cancel();
                self.emit(JobEvent::Cancelled {
                    operation: kind,
                    job_id: prev.job_id,
                });
            }
        }

        let observer = BroadcastObserver::new(kind, self.event_tx.clone());
        let active = Arc::clone(&self.active);
        let event_tx = self.event_tx.clone();
        let task_job_id = job_id.clone();
        let task_cancel = poll_cancel.clone();

        let task = self.tracker.spawn(async move {
            tracing::info!(operation = %kind, job_id = %task_job_id, "Poller started");
            let outcome = poll_job(
                source.as_ref(),
                &task_job_id,
                &config,
                &observer,
                &task_cancel,
            )
            .await;

            let mut active = active.lock().await;
            let still_current = active
                .get(&kind)
                .is_some_and(|a| a.generation == generation);
            if still_current {
                active.remove(&kind);
                // Cancelled through its own handle: nobody else announced it.
                if matches!(outcome, Err(PollError::Cancelled)) {
                    let _ = event_tx.send(JobEvent::Cancelled {
                        operation: kind,
                        job_id: task_job_id.clone(),
                    });
                }
            }
            tracing::info!(operation = %kind, job_id = %task_job_id, "Poller exited");
            outcome
        });

        PollHandle::new(job_id, poll_cancel, task)
    }

    /// Currently running pollers as `(kind, job_id)` pairs.
    pub async fn active(&self) -> Vec<(JobKind, JobId)> {
        self.active
            .lock()
            .await
            .iter()
            .map(|(kind, poll)| (*kind, poll.job_id.clone()))
            .collect()
    }

    /// Cancel the poller for `kind`. Returns `false` if none was running.
    pub async fn cancel(&self, kind: JobKind) -> bool {
        let removed = self.active.lock().await.remove(&kind);
        match removed {
            Some(poll) => {
                tracing::info!(operation = %kind, job_id = %poll.job_id, "Cancelling poller");
                poll.cancel.cancel();
                self.emit(JobEvent::Cancelled {
                    operation: kind,
                    job_id: poll.job_id,
                });
                true
            }
            None => false,
        }
    }

    /// Cancel every poller and wait for their tasks to exit.
    ///
    /// Pollers started after shutdown are cancelled immediately.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down poller registry");
        self.cancel.cancel();

        let drained: Vec<(JobKind, ActivePoll)> = self.active.lock().await.drain().collect();
        for (kind, poll) in drained {
            self.emit(JobEvent::Cancelled {
                operation: kind,
                job_id: poll.job_id,
            });
        }

        self.tracker.close();
        if tokio::time::timeout(SHUTDOWN_GRACE, self.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                remaining = self.tracker.len(),
                "Pollers did not exit within the shutdown grace period",
            );
        }

        tracing::info!("Poller registry shut down complete");
    }

    fn emit(&self, event: JobEvent) {
        let _ = self.event_tx.send(event);
    }
}
