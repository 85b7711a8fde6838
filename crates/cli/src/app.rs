//! Command execution.

use std::time::Duration;

use adgen_client::api::{AdGenApi, ApiError};
use adgen_client::dashboard::load_dashboard;
use adgen_client::models::ScrapeRequest;
use adgen_client::sources::status_source;
use adgen_core::error::CoreError;
use adgen_core::job::JobKind;
use adgen_core::polling::COSMETIC_TICK_INTERVAL;
use adgen_core::session::{PendingJob, SessionStore};
use adgen_core::types::JobId;
use adgen_poller::config::PollConfig;
use adgen_poller::events::JobEvent;
use adgen_poller::poller::PollError;
use adgen_poller::progress::spawn_cosmetic_progress;
use adgen_poller::registry::PollerRegistry;
use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::args::{Command, USAGE};
use crate::config::CliConfig;
use crate::display::ProgressLine;

/// How long to let the progress line finish after polling ends.
const REPORTER_GRACE: Duration = Duration::from_millis(250);

/// Order in which `resume` looks for pending jobs.
const RESUME_ORDER: [JobKind; 4] = [
    JobKind::Scrape,
    JobKind::BulkAds,
    JobKind::AvatarVideo,
    JobKind::CinematicAd,
];

pub struct App {
    api: AdGenApi,
    session: SessionStore,
    resume_max_age: chrono::Duration,
    registry: PollerRegistry,
    shutdown: CancellationToken,
    cadence: fn(JobKind) -> PollConfig,
}

impl App {
    pub fn new(config: &CliConfig, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let api = AdGenApi::new(&config.client)?;
        let session = SessionStore::hydrate(&config.session_file)?;
        tracing::debug!(
            api_url = api.api_url(),
            session_file = %config.session_file.display(),
            "Client ready",
        );
        Ok(Self {
            api,
            session,
            resume_max_age: config.resume_max_age,
            registry: PollerRegistry::new(),
            shutdown,
            cadence: PollConfig::for_kind,
        })
    }

    pub async fn run(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Scrape { url } => self.scrape(url).await,
            Command::Watch { job_id, kind } => self.follow(kind, job_id).await.map(|_| ()),
            Command::Resume => self.resume().await,
            Command::Dashboard => self.dashboard().await,
            Command::Reset => {
                self.session.clear()?;
                println!("Session cleared.");
                Ok(())
            }
            Command::Help => {
                println!("{USAGE}");
                Ok(())
            }
        }
    }

    /// Cancel any poller still running.
    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
    }

    async fn scrape(&mut self, url: String) -> anyhow::Result<()> {
        let ticket = self
            .api
            .submit_scrape(&ScrapeRequest::new(url))
            .await
            .map_err(friendly)?;
        tracing::info!(job_id = %ticket.job_id, "Scrape started");

        let result = self.follow(JobKind::Scrape, ticket.job_id).await?;
        if let Some(product_id) = result.get("product_id").and_then(|v| v.as_str()) {
            self.session
                .set_selected_product(Some(product_id.to_string()))?;
        }
        Ok(())
    }

    /// Follow every resumable job in [`RESUME_ORDER`].
    ///
    /// A job that fails or times out does not stop the rest; the
    /// failures are reported together at the end.
    async fn resume(&mut self) -> anyhow::Result<()> {
        let jobs = self.resumable_jobs()?;
        if jobs.is_empty() {
            println!("No pending jobs to resume.");
            return Ok(());
        }

        let mut failures = Vec::new();
        for job in jobs {
            if self.shutdown.is_cancelled() {
                break;
            }
            tracing::info!(kind = %job.kind, job_id = %job.job_id, "Resuming pending job");
            if let Err(e) = self.follow(job.kind, job.job_id.clone()).await {
                tracing::warn!(kind = %job.kind, job_id = %job.job_id, error = %e, "Resumed job did not finish");
                failures.push(format!("{}: {e}", job.kind));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(failures.join("\n")))
        }
    }

    /// Pending jobs young enough to resume. Stale entries are dropped
    /// from the session file.
    fn resumable_jobs(&mut self) -> Result<Vec<PendingJob>, CoreError> {
        let now = Utc::now();
        let mut jobs = Vec::new();
        for kind in RESUME_ORDER {
            if let Some(job) = self.session.resumable(kind, now, self.resume_max_age)? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }

    async fn dashboard(&self) -> anyhow::Result<()> {
        let snapshot = load_dashboard(&self.api).await;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        Ok(())
    }

    /// Poll `job_id` to a terminal state, printing progress to stderr
    /// and the result to stdout.
    ///
    /// The job stays in the session file until it completes or fails,
    /// so an interrupted or timed-out run can be resumed.
    async fn follow(&mut self, kind: JobKind, job_id: JobId) -> anyhow::Result<serde_json::Value> {
        self.begin(kind, &job_id)?;

        let events = self.registry.subscribe();
        let handle = self
            .registry
            .start(
                kind,
                job_id.clone(),
                status_source(&self.api, kind),
                (self.cadence)(kind),
            )
            .await;
        let progress = spawn_cosmetic_progress(COSMETIC_TICK_INTERVAL, self.shutdown.child_token());
        let mut reporter = tokio::spawn(report_progress(events, progress.subscribe(), job_id.clone()));

        let outcome = tokio::select! {
            outcome = handle.join() => outcome,
            _ = self.shutdown.cancelled() => {
                self.registry.cancel(kind).await;
                Err(PollError::Cancelled)
            }
        };

        let shown = match &outcome {
            Ok(_) => progress.complete().await,
            Err(_) => progress.stop().await,
        };
        if tokio::time::timeout(REPORTER_GRACE, &mut reporter).await.is_err() {
            reporter.abort();
        }
        tracing::debug!(job_id = %job_id, shown, "Progress display stopped");

        self.settle(kind, &job_id, &outcome)?;
        match outcome {
            Ok(result) => {
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(result)
            }
            Err(err) => Err(anyhow::anyhow!(err.user_message())),
        }
    }

    /// Record `job_id` as the pending job of `kind` unless it already is.
    fn begin(&mut self, kind: JobKind, job_id: &str) -> Result<(), CoreError> {
        if self.session.pending(kind).is_some_and(|p| p.job_id == job_id) {
            return Ok(());
        }
        let mut pending = PendingJob::new(kind, job_id, Utc::now());
        if let Some(product_id) = self.session.selected_product() {
            pending = pending.with_product(product_id);
        }
        self.session.track(pending)
    }

    /// Update the session once polling ends. Cancelled and timed-out
    /// jobs stay pending so `resume` can pick them up.
    fn settle(
        &mut self,
        kind: JobKind,
        job_id: &str,
        outcome: &Result<serde_json::Value, PollError>,
    ) -> Result<(), CoreError> {
        match outcome {
            Err(PollError::Cancelled | PollError::TimedOut { .. }) => {
                tracing::info!(
                    kind = %kind,
                    job_id,
                    "Job left pending; run `adgen resume` to keep waiting",
                );
                Ok(())
            }
            _ => self.forget(kind),
        }
    }

    /// Drop the pending entry for `kind`, if there is one.
    fn forget(&mut self, kind: JobKind) -> Result<(), CoreError> {
        match self.session.finish(kind) {
            Ok(_) | Err(CoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Convert a client error into the message shown to the user.
fn friendly(err: ApiError) -> anyhow::Error {
    tracing::debug!(error = %err, "Request failed");
    anyhow::anyhow!(err.user_message())
}

/// Render progress for `job_id` until a terminal event arrives.
async fn report_progress(
    mut events: broadcast::Receiver<JobEvent>,
    mut cosmetic: watch::Receiver<u8>,
    job_id: JobId,
) {
    let mut line = ProgressLine::default();
    let mut cosmetic_open = true;

    loop {
        let finished = tokio::select! {
            event = events.recv() => match event {
                Ok(event) if event.job_id() == job_id => line.apply(event),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = cosmetic.changed(), if cosmetic_open => {
                if changed.is_err() {
                    cosmetic_open = false;
                    continue;
                }
                line.set_cosmetic(*cosmetic.borrow());
                false
            }
        };

        eprint!("{}", line.render());
        if finished {
            break;
        }
    }
    eprintln!();
}
