//! Job lifecycle events broadcast by the poller registry.
//!
//! These mirror the observer callbacks but are tagged with the
//! operation they belong to so a single subscriber can follow every
//! active poller.

use adgen_core::job::JobKind;
use adgen_core::types::JobId;
use serde::Serialize;

/// A lifecycle event for one polled job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// A non-terminal status was observed.
    Progress {
        operation: JobKind,
        job_id: JobId,
        /// Completion percentage (0-100), never lower than a previous event.
        percent: u8,
        current_step: Option<String>,
    },

    /// The job completed with a result.
    Completed {
        operation: JobKind,
        job_id: JobId,
        result: serde_json::Value,
    },

    /// The job failed, or polling gave up.
    Failed {
        operation: JobKind,
        job_id: JobId,
        error: String,
        /// `true` when the attempt cap was exhausted.
        timed_out: bool,
    },

    /// Polling was stopped before a terminal status.
    Cancelled { operation: JobKind, job_id: JobId },
}

impl JobEvent {
    pub fn job_id(&self) -> &str {
        match self {
            JobEvent::Progress { job_id, .. }
            | JobEvent::Completed { job_id, .. }
            | JobEvent::Failed { job_id, .. }
            | JobEvent::Cancelled { job_id, .. } => job_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEvent::Progress { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = JobEvent::Failed {
            operation: JobKind::Scrape,
            job_id: "j1".into(),
            error: "boom".into(),
            timed_out: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "failed");
        assert_eq!(json["operation"], "scrape");
        assert_eq!(json["timed_out"], true);
    }
}
