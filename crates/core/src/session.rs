//! Typed, file-backed session state.
//!
//! Remembers which jobs were in flight (and for which product) so a
//! restarted client can resume polling instead of resubmitting. The
//! store has an explicit lifecycle: [`SessionStore::hydrate`] on load,
//! mutate through typed methods (each persists immediately), and
//! [`SessionStore::clear`] on reset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job::JobKind;
use crate::types::{JobId, Timestamp};

/// A job the client started and has not yet seen finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingJob {
    pub kind: JobKind,
    pub job_id: JobId,
    /// Product the job was started for, when relevant.
    #[serde(default)]
    pub product_id: Option<String>,
    pub started_at: Timestamp,
}

impl PendingJob {
    pub fn new(kind: JobKind, job_id: impl Into<JobId>, started_at: Timestamp) -> Self {
        Self {
            kind,
            job_id: job_id.into(),
            product_id: None,
            started_at,
        }
    }

    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    /// Whether more than `max_age` has passed since the job started.
    pub fn is_stale(&self, now: Timestamp, max_age: chrono::Duration) -> bool {
        now.signed_duration_since(self.started_at) > max_age
    }
}

/// Everything the client keeps between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub pending: HashMap<JobKind, PendingJob>,
    #[serde(default)]
    pub selected_product_id: Option<String>,
}

/// File-backed owner of [`SessionState`].
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    state: SessionState,
}

impl SessionStore {
    /// Load state from `path`.
    ///
    /// A missing file yields the default state. A file that exists but
    /// cannot be parsed is an error rather than silently discarded.
    pub fn hydrate(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                CoreError::Internal(format!(
                    "Corrupt session file {}: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionState::default(),
            Err(e) => {
                return Err(CoreError::Internal(format!(
                    "Failed to read session file {}: {e}",
                    path.display()
                )))
            }
        };
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn pending(&self, kind: JobKind) -> Option<&PendingJob> {
        self.state.pending.get(&kind)
    }

    /// Record `job`, replacing any pending job of the same kind.
    pub fn track(&mut self, job: PendingJob) -> Result<(), CoreError> {
        self.state.pending.insert(job.kind, job);
        self.persist()
    }

    /// Forget the pending job of `kind`, returning it.
    pub fn finish(&mut self, kind: JobKind) -> Result<PendingJob, CoreError> {
        let job = self
            .state
            .pending
            .remove(&kind)
            .ok_or(CoreError::NotFound { kind })?;
        self.persist()?;
        Ok(job)
    }

    /// The pending job of `kind` if it is young enough to resume.
    ///
    /// A stale entry is dropped (and the drop persisted) so it is not
    /// offered again.
    pub fn resumable(
        &mut self,
        kind: JobKind,
        now: Timestamp,
        max_age: chrono::Duration,
    ) -> Result<Option<PendingJob>, CoreError> {
        let Some(job) = self.state.pending.get(&kind) else {
            return Ok(None);
        };
        if job.is_stale(now, max_age) {
            self.state.pending.remove(&kind);
            self.persist()?;
            return Ok(None);
        }
        Ok(Some(job.clone()))
    }

    pub fn selected_product(&self) -> Option<&str> {
        self.state.selected_product_id.as_deref()
    }

    pub fn set_selected_product(&mut self, product_id: Option<String>) -> Result<(), CoreError> {
        self.state.selected_product_id = product_id;
        self.persist()
    }

    /// Reset to the default state and delete the backing file.
    pub fn clear(&mut self) -> Result<(), CoreError> {
        self.state = SessionState::default();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Internal(format!(
                "Failed to remove session file {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn persist(&self) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(&self.state)
            .map_err(|e| CoreError::Internal(format!("Failed to encode session: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| {
            CoreError::Internal(format!(
                "Failed to write session file {}: {e}",
                self.path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn t(mins: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(mins)
    }

    #[test]
    fn missing_file_hydrates_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::hydrate(dir.path().join("session.json")).unwrap();
        assert_eq!(store.state(), &SessionState::default());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_matches!(SessionStore::hydrate(&path), Err(CoreError::Internal(_)));
    }

    #[test]
    fn tracked_job_survives_rehydration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::hydrate(&path).unwrap();
        store
            .track(PendingJob::new(JobKind::BulkAds, "job-1", t(0)).with_product("prod-7"))
            .unwrap();
        store.set_selected_product(Some("prod-7".into())).unwrap();

        let reloaded = SessionStore::hydrate(&path).unwrap();
        let job = reloaded.pending(JobKind::BulkAds).unwrap();
        assert_eq!(job.job_id, "job-1");
        assert_eq!(job.product_id.as_deref(), Some("prod-7"));
        assert_eq!(reloaded.selected_product(), Some("prod-7"));
    }

    #[test]
    fn track_replaces_same_kind() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::hydrate(dir.path().join("s.json")).unwrap();
        store.track(PendingJob::new(JobKind::Scrape, "a", t(0))).unwrap();
        store.track(PendingJob::new(JobKind::Scrape, "b", t(1))).unwrap();
        assert_eq!(store.state().pending.len(), 1);
        assert_eq!(store.pending(JobKind::Scrape).unwrap().job_id, "b");
    }

    #[test]
    fn finish_removes_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::hydrate(dir.path().join("s.json")).unwrap();
        store.track(PendingJob::new(JobKind::Scrape, "a", t(0))).unwrap();

        assert_eq!(store.finish(JobKind::Scrape).unwrap().job_id, "a");
        assert_matches!(
            store.finish(JobKind::Scrape),
            Err(CoreError::NotFound { kind: JobKind::Scrape })
        );
    }

    #[test]
    fn fresh_job_is_resumable() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SessionStore::hydrate(dir.path().join("s.json")).unwrap();
        store.track(PendingJob::new(JobKind::CinematicAd, "c", t(0))).unwrap();

        let job = store
            .resumable(JobKind::CinematicAd, t(10), Duration::minutes(30))
            .unwrap();
        assert_eq!(job.map(|j| j.job_id).as_deref(), Some("c"));
    }

    #[test]
    fn stale_job_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let mut store = SessionStore::hydrate(&path).unwrap();
        store.track(PendingJob::new(JobKind::CinematicAd, "c", t(0))).unwrap();

        let job = store
            .resumable(JobKind::CinematicAd, t(31), Duration::minutes(30))
            .unwrap();
        assert!(job.is_none());

        let reloaded = SessionStore::hydrate(&path).unwrap();
        assert!(reloaded.pending(JobKind::CinematicAd).is_none());
    }

    #[test]
    fn clear_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let mut store = SessionStore::hydrate(&path).unwrap();
        store.track(PendingJob::new(JobKind::Scrape, "a", t(0))).unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.state(), &SessionState::default());
        // Clearing twice is fine.
        store.clear().unwrap();
    }
}
