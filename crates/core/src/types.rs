/// Backend job identifiers are opaque strings.
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Error type returned by job status sources.
///
/// Boxed so the poller can log any transport failure without knowing
/// which client produced it.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
