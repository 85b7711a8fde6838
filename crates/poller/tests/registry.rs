//! Integration tests for `PollerRegistry`.
//!
//! Verify one-poller-per-kind semantics, event broadcasting, and
//! shutdown behaviour.

mod common;

use std::sync::Arc;

use adgen_core::job::{JobKind, JobSnapshot};
use adgen_poller::config::PollConfig;
use adgen_poller::events::JobEvent;
use adgen_poller::poller::PollError;
use adgen_poller::registry::PollerRegistry;
use assert_matches::assert_matches;
use serde_json::json;
use tokio::sync::broadcast;

use common::ScriptedSource;

fn drain(rx: &mut broadcast::Receiver<JobEvent>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ---------------------------------------------------------------------------
// Test: a completed poll is broadcast and removed from the active set
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn completed_poll_is_broadcast_and_removed() {
    let registry = PollerRegistry::new();
    let mut rx = registry.subscribe();
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(JobSnapshot::processing(50.0, Some("Scraping"))),
        Ok(JobSnapshot::completed(json!({"title": "Bottle"}))),
    ]));

    let handle = registry
        .start(JobKind::Scrape, "scrape-1", source, PollConfig::standard())
        .await;
    assert_eq!(
        registry.active().await,
        vec![(JobKind::Scrape, "scrape-1".to_string())]
    );

    assert_eq!(handle.join().await.unwrap(), json!({"title": "Bottle"}));
    assert!(registry.active().await.is_empty());

    assert_eq!(
        drain(&mut rx),
        vec![
            JobEvent::Progress {
                operation: JobKind::Scrape,
                job_id: "scrape-1".into(),
                percent: 50,
                current_step: Some("Scraping".into()),
            },
            JobEvent::Completed {
                operation: JobKind::Scrape,
                job_id: "scrape-1".into(),
                result: json!({"title": "Bottle"}),
            },
        ]
    );
}

// ---------------------------------------------------------------------------
// Test: starting a second poll for the same kind supersedes the first
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn same_kind_supersedes_previous_poller() {
    let registry = PollerRegistry::new();
    let mut rx = registry.subscribe();
    let first_source = Arc::new(ScriptedSource::forever_processing());

    let first = registry
        .start(
            JobKind::BulkAds,
            "ads-1",
            first_source.clone(),
            PollConfig::standard(),
        )
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(2500)).await;

    let second = registry
        .start(
            JobKind::BulkAds,
            "ads-2",
            Arc::new(ScriptedSource::forever_processing()),
            PollConfig::standard(),
        )
        .await;

    assert_matches!(first.join().await, Err(PollError::Cancelled));
    let calls_at_cancel = first_source.calls();
    assert_eq!(
        registry.active().await,
        vec![(JobKind::BulkAds, "ads-2".to_string())]
    );

    tokio::time::sleep(std::time::Duration::from_secs(10)).await;
    assert_eq!(first_source.calls(), calls_at_cancel);

    let cancelled: Vec<JobEvent> = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, JobEvent::Cancelled { .. }))
        .collect();
    assert_eq!(
        cancelled,
        vec![JobEvent::Cancelled {
            operation: JobKind::BulkAds,
            job_id: "ads-1".into(),
        }]
    );

    second.cancel();
    let _ = second.join().await;
}

// ---------------------------------------------------------------------------
// Test: different kinds run side by side
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn different_kinds_run_concurrently() {
    let registry = PollerRegistry::new();

    let _scrape = registry
        .start(
            JobKind::Scrape,
            "s-1",
            Arc::new(ScriptedSource::forever_processing()),
            PollConfig::standard(),
        )
        .await;
    let _cinematic = registry
        .start(
            JobKind::CinematicAd,
            "c-1",
            Arc::new(ScriptedSource::forever_processing()),
            PollConfig::long_running(),
        )
        .await;

    let mut active = registry.active().await;
    active.sort_by_key(|(kind, _)| kind.as_str());
    assert_eq!(
        active,
        vec![
            (JobKind::CinematicAd, "c-1".to_string()),
            (JobKind::Scrape, "s-1".to_string()),
        ]
    );

    registry.shutdown().await;
}

// ---------------------------------------------------------------------------
// Test: cancel() by kind
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn cancel_by_kind_emits_one_event() {
    let registry = PollerRegistry::new();
    let mut rx = registry.subscribe();

    let handle = registry
        .start(
            JobKind::AvatarVideo,
            "av-1",
            Arc::new(ScriptedSource::forever_processing()),
            PollConfig::long_running(),
        )
        .await;

    assert!(registry.cancel(JobKind::AvatarVideo).await);
    assert!(!registry.cancel(JobKind::AvatarVideo).await);
    assert_matches!(handle.join().await, Err(PollError::Cancelled));

    assert_eq!(
        drain(&mut rx),
        vec![JobEvent::Cancelled {
            operation: JobKind::AvatarVideo,
            job_id: "av-1".into(),
        }]
    );
}

// ---------------------------------------------------------------------------
// Test: cancelling through the handle is announced by the poller itself
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn handle_cancel_is_announced_once() {
    let registry = PollerRegistry::new();
    let mut rx = registry.subscribe();

    let handle = registry
        .start(
            JobKind::Scrape,
            "s-2",
            Arc::new(ScriptedSource::forever_processing()),
            PollConfig::standard(),
        )
        .await;

    handle.cancel();
    assert_matches!(handle.join().await, Err(PollError::Cancelled));
    assert!(registry.active().await.is_empty());

    assert_eq!(
        drain(&mut rx),
        vec![JobEvent::Cancelled {
            operation: JobKind::Scrape,
            job_id: "s-2".into(),
        }]
    );
}

// ---------------------------------------------------------------------------
// Test: shutdown cancels everything, later starts are dead on arrival
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_all_pollers() {
    let registry = PollerRegistry::new();

    let a = registry
        .start(
            JobKind::Scrape,
            "s-3",
            Arc::new(ScriptedSource::forever_processing()),
            PollConfig::standard(),
        )
        .await;
    let b = registry
        .start(
            JobKind::CinematicAd,
            "c-3",
            Arc::new(ScriptedSource::forever_processing()),
            PollConfig::long_running(),
        )
        .await;

    registry.shutdown().await;

    assert_matches!(a.join().await, Err(PollError::Cancelled));
    assert_matches!(b.join().await, Err(PollError::Cancelled));
    assert!(registry.active().await.is_empty());

    let late_source = Arc::new(ScriptedSource::forever_processing());
    let late = registry
        .start(
            JobKind::Scrape,
            "s-4",
            late_source.clone(),
            PollConfig::standard(),
        )
        .await;
    assert_matches!(late.join().await, Err(PollError::Cancelled));
    assert_eq!(late_source.calls(), 0);
}
