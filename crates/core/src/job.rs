//! Client-side view of an asynchronous backend job.
//!
//! Jobs are created by a submission call that returns a `job_id`
//! immediately and are mutated only by the backend. The client reads
//! a [`JobSnapshot`] repeatedly until it observes a terminal
//! [`JobState`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::JobId;

// ---------------------------------------------------------------------------
// Job state
// ---------------------------------------------------------------------------

/// Backend-reported job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    /// `completed` and `failed` end polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Whether the backend may move a job from `self` to `next`.
    ///
    /// - `queued -> processing | completed | failed`
    /// - `processing -> processing | completed | failed`
    /// - terminal states never change.
    pub fn can_transition_to(self, next: JobState) -> bool {
        match self {
            JobState::Queued => next != JobState::Queued,
            JobState::Processing => next != JobState::Queued,
            JobState::Completed | JobState::Failed => false,
        }
    }

    /// Validate a transition observed between two polls.
    ///
    /// `queued -> queued` is accepted as "no change yet".
    pub fn validate_transition(self, next: JobState) -> Result<(), CoreError> {
        if self == next && !self.is_terminal() {
            return Ok(());
        }
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "{} -> {}",
                self.as_str(),
                next.as_str()
            )))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job kind
// ---------------------------------------------------------------------------

/// The logical operation a job belongs to.
///
/// At most one poller runs per kind at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Scrape,
    BulkAds,
    CinematicAd,
    AvatarVideo,
}

impl JobKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Scrape => "scrape",
            JobKind::BulkAds => "bulk_ads",
            JobKind::CinematicAd => "cinematic_ad",
            JobKind::AvatarVideo => "avatar_video",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "scrape" => Ok(JobKind::Scrape),
            "bulk_ads" => Ok(JobKind::BulkAds),
            "cinematic_ad" => Ok(JobKind::CinematicAd),
            "avatar_video" => Ok(JobKind::AvatarVideo),
            other => Err(CoreError::Validation(format!("Unknown job kind '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress and snapshot
// ---------------------------------------------------------------------------

/// Intermediate progress reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Completion percentage. Expected in `0..=100`.
    #[serde(default)]
    pub percentage: f64,
    /// Description of the step currently running, if any.
    #[serde(default)]
    pub current_step: Option<String>,
}

impl JobProgress {
    pub fn new(percentage: f64, current_step: Option<String>) -> Self {
        Self {
            percentage,
            current_step,
        }
    }

    /// Percentage clamped to `0..=100` and rounded down.
    pub fn percent(&self) -> u8 {
        if self.percentage.is_nan() {
            return 0;
        }
        self.percentage.clamp(0.0, 100.0) as u8
    }
}

/// One observation of a job's status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobState,
    #[serde(default)]
    pub progress: Option<JobProgress>,
    /// Present only when `status == completed`.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Present only when `status == failed`.
    #[serde(default)]
    pub error: Option<String>,
}

impl JobSnapshot {
    pub fn queued() -> Self {
        Self {
            status: JobState::Queued,
            progress: None,
            result: None,
            error: None,
        }
    }

    pub fn processing(percentage: f64, current_step: Option<&str>) -> Self {
        Self {
            status: JobState::Processing,
            progress: Some(JobProgress::new(
                percentage,
                current_step.map(str::to_string),
            )),
            result: None,
            error: None,
        }
    }

    pub fn completed(result: serde_json::Value) -> Self {
        Self {
            status: JobState::Completed,
            progress: Some(JobProgress::new(100.0, None)),
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobState::Failed,
            progress: None,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Acknowledgement returned by every job submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTicket {
    pub job_id: JobId,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
