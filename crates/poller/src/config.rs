//! Polling cadence.

use std::time::Duration;

use adgen_core::job::JobKind;
use adgen_core::polling::{
    LONG_RUNNING_POLL_INTERVAL, STANDARD_MAX_ATTEMPTS, STANDARD_POLL_INTERVAL,
};

/// How often to check a job and when to give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before each status check.
    pub interval: Duration,
    /// Maximum number of status checks. `None` polls until terminal.
    pub max_attempts: Option<u32>,
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// 1 s interval, 180 attempts: scraping and bulk ad generation.
    pub fn standard() -> Self {
        Self::new(STANDARD_POLL_INTERVAL, Some(STANDARD_MAX_ATTEMPTS))
    }

    /// 5 s interval, no cap: cinematic and avatar video generation.
    pub fn long_running() -> Self {
        Self::new(LONG_RUNNING_POLL_INTERVAL, None)
    }

    /// The cadence used for jobs of `kind`.
    pub fn for_kind(kind: JobKind) -> Self {
        match kind {
            JobKind::Scrape | JobKind::BulkAds => Self::standard(),
            JobKind::CinematicAd | JobKind::AvatarVideo => Self::long_running(),
        }
    }

    /// Upper bound on total polling time, if capped.
    pub fn deadline(&self) -> Option<Duration> {
        self.max_attempts.map(|n| self.interval * n)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::standard()
    }
}
