//! Polling cadence constants shared by the poller and the CLI.

use std::time::Duration;

/// Interval for real backend polling of short jobs (scrape, bulk ads).
pub const STANDARD_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Attempt cap for short jobs: 180 checks at 1 s is three minutes.
pub const STANDARD_MAX_ATTEMPTS: u32 = 180;

/// Interval for long-running video jobs, which poll without a cap.
pub const LONG_RUNNING_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Tick of the cosmetic progress animation.
pub const COSMETIC_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// The cosmetic percentage never passes this value before real completion.
pub const COSMETIC_PROGRESS_CAP: u8 = 95;

/// Default age after which a stored pending job is no longer resumed.
pub const DEFAULT_RESUME_MAX_AGE_MINS: i64 = 30;
