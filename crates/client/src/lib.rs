//! Typed REST client for the ad-generation backend.
//!
//! Wraps job submission (scraping, bulk ads, avatar and cinematic
//! videos), job status reads, and account endpoints using [`reqwest`].
//! [`sources`] adapts the status endpoints to
//! [`JobStatusSource`](adgen_core::source::JobStatusSource) so they can
//! be polled.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod envelope;
pub mod models;
pub mod sources;
