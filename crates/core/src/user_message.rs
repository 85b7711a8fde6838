//! Turning job failures into messages a user can act on.
//!
//! Backend error strings are surfaced verbatim unless they match one of
//! a few well-known patterns, which are rewritten into friendlier text.

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network or connection failure while talking to the backend.
    Transient,
    /// The backend reported `status: failed`.
    Backend,
    /// The attempt cap was exhausted without a terminal status.
    Timeout,
    /// Required input was missing before any request was made.
    Validation,
}

pub const TIMEOUT_MESSAGE: &str =
    "This is taking longer than expected. Please try again in a moment.";

pub const QUOTA_MESSAGE: &str =
    "The generation service is at capacity right now. Please try again later.";

pub const BACKEND_TIMEOUT_MESSAGE: &str =
    "The generation service took too long to respond. Please try again.";

pub const MISCONFIGURED_MESSAGE: &str =
    "The generation service is not configured correctly. Please contact support.";

pub const TRANSIENT_MESSAGE: &str =
    "We could not reach the server. Check your connection and try again.";

const QUOTA_PATTERNS: &[&str] = &["quota", "rate limit", "resource_exhausted"];
const TIMEOUT_PATTERNS: &[&str] = &["timeout", "timed out", "deadline exceeded"];
const MISCONFIGURED_PATTERNS: &[&str] = &["not configured", "api key", "misconfigur"];

/// Rewrite a backend-reported failure message.
///
/// Matching is case-insensitive. Unknown messages are returned as-is
/// (trimmed); an empty message becomes a generic one.
pub fn backend_message(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let contains_any = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

    if contains_any(QUOTA_PATTERNS) {
        QUOTA_MESSAGE.to_string()
    } else if contains_any(TIMEOUT_PATTERNS) {
        BACKEND_TIMEOUT_MESSAGE.to_string()
    } else if contains_any(MISCONFIGURED_PATTERNS) {
        MISCONFIGURED_MESSAGE.to_string()
    } else if raw.trim().is_empty() {
        "The job failed without an error message.".to_string()
    } else {
        raw.trim().to_string()
    }
}

/// Produce the message shown to the user for a failure of `kind`.
///
/// `detail` is the raw error text, used for backend and validation
/// failures.
pub fn user_message(kind: FailureKind, detail: &str) -> String {
    match kind {
        FailureKind::Transient => TRANSIENT_MESSAGE.to_string(),
        FailureKind::Backend => backend_message(detail),
        FailureKind::Timeout => TIMEOUT_MESSAGE.to_string(),
        FailureKind::Validation => detail.to_string(),
    }
}
