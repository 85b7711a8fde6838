use crate::job::JobKind;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No pending {kind} job")]
    NotFound { kind: JobKind },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid job state transition: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
