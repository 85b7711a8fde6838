//! Shared domain types for the ad-generation job client.
//!
//! Holds the client-side job model, the [`source::JobStatusSource`]
//! seam, cosmetic progress, user-facing failure messages, pre-flight
//! validation, and the typed session store.

pub mod error;
pub mod fake_progress;
pub mod job;
pub mod polling;
pub mod session;
pub mod source;
pub mod types;
pub mod user_message;
pub mod validation;
