//! Cancellable job polling.
//!
//! [`poller::poll_job`] drives a single job to a terminal state through
//! a [`JobStatusSource`](adgen_core::source::JobStatusSource),
//! reporting progress to a [`observer::PollObserver`].
//! [`registry::PollerRegistry`] owns spawned pollers and keeps at most
//! one running per [`JobKind`](adgen_core::job::JobKind).
//! [`progress`] runs the cosmetic progress ticker shown alongside.

pub mod config;
pub mod events;
pub mod observer;
pub mod poller;
pub mod progress;
pub mod registry;
