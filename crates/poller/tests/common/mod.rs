//! Shared test doubles for poller integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::time::Duration;

use adgen_core::job::{JobProgress, JobSnapshot};
use adgen_core::source::JobStatusSource;
use adgen_core::types::BoxError;
use adgen_poller::observer::PollObserver;
use adgen_poller::poller::PollError;
use async_trait::async_trait;

/// One scripted reply: a snapshot or a transport error message.
pub type Reply = Result<JobSnapshot, String>;

/// Replays a fixed script of replies, then repeats `fallback` forever.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Reply>>,
    fallback: JobSnapshot,
    calls: AtomicU32,
    /// Artificial latency for each fetch.
    delay: Duration,
}

impl ScriptedSource {
    pub fn new(script: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: JobSnapshot::processing(0.0, None),
            calls: AtomicU32::new(0),
            delay: Duration::ZERO,
        }
    }

    /// A job that stays `processing` forever.
    pub fn forever_processing() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobStatusSource for ScriptedSource {
    async fn fetch_status(&self, _job_id: &str) -> Result<JobSnapshot, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(snapshot)) => Ok(snapshot),
            Some(Err(message)) => Err(message.into()),
            None => Ok(self.fallback.clone()),
        }
    }
}

/// A callback observed by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Progress(u8, Option<String>),
    Completed(serde_json::Value),
    Failed(PollError),
}

#[derive(Default)]
pub struct RecordingObserver {
    calls: Mutex<Vec<Call>>,
}

impl RecordingObserver {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn progress_percents(&self) -> Vec<u8> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Progress(p, _) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn terminal_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Progress(..)))
            .collect()
    }
}

impl PollObserver for RecordingObserver {
    fn on_progress(&self, _job_id: &str, progress: &JobProgress) {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Progress(progress.percent(), progress.current_step.clone()));
    }

    fn on_completed(&self, _job_id: &str, result: &serde_json::Value) {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Completed(result.clone()));
    }

    fn on_failed(&self, _job_id: &str, error: &PollError) {
        self.calls.lock().unwrap().push(Call::Failed(error.clone()));
    }
}

/// A source whose fetch blocks its worker thread between two barriers.
///
/// The test waits on `entered` to know a fetch is in progress, does
/// whatever it needs, then waits on `release` to let the fetch return
/// `reply`. Only usable on a multi-thread runtime.
pub struct GatedSource {
    pub entered: Arc<Barrier>,
    pub release: Arc<Barrier>,
    reply: JobSnapshot,
}

impl GatedSource {
    pub fn new(reply: JobSnapshot) -> Self {
        Self {
            entered: Arc::new(Barrier::new(2)),
            release: Arc::new(Barrier::new(2)),
            reply,
        }
    }
}

#[async_trait]
impl JobStatusSource for GatedSource {
    async fn fetch_status(&self, _job_id: &str) -> Result<JobSnapshot, BoxError> {
        self.entered.wait();
        self.release.wait();
        Ok(self.reply.clone())
    }
}
