//! [`JobStatusSource`] adapters over the backend's status endpoints.

use std::sync::Arc;

use adgen_core::job::{JobKind, JobSnapshot};
use adgen_core::source::JobStatusSource;
use adgen_core::types::BoxError;
use async_trait::async_trait;

use crate::api::AdGenApi;

/// The generic `GET /jobs/{job_id}` endpoint.
#[async_trait]
impl JobStatusSource for AdGenApi {
    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot, BoxError> {
        Ok(self.job_status(job_id).await?)
    }
}

/// Cinematic jobs, read from `GET /cinematic-ad/jobs/{job_id}`.
#[derive(Debug, Clone)]
pub struct CinematicJobs(pub AdGenApi);

#[async_trait]
impl JobStatusSource for CinematicJobs {
    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot, BoxError> {
        Ok(self.0.cinematic_status(job_id).await?)
    }
}

/// The status source that serves jobs of `kind`.
pub fn status_source(api: &AdGenApi, kind: JobKind) -> Arc<dyn JobStatusSource> {
    match kind {
        JobKind::CinematicAd => Arc::new(CinematicJobs(api.clone())),
        JobKind::Scrape | JobKind::BulkAds | JobKind::AvatarVideo => Arc::new(api.clone()),
    }
}
