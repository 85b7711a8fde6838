//! The seam between the poller and whatever knows a job's status.

use async_trait::async_trait;

use crate::job::JobSnapshot;
use crate::types::BoxError;

/// Reads the current status of a backend job.
///
/// Implementations must be idempotent and free of side effects: the
/// poller calls [`fetch_status`](Self::fetch_status) repeatedly and
/// treats any error as transient.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot, BoxError>;
}
