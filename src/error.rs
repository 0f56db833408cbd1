use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeeError {
    /// Bad operator input (non-positive amount, missing student selection).
    /// Recovered locally, never reaches the store.
    #[error("validation error: {0}")]
    Validation(String),
    /// The transaction store rejected or failed a call. Never swallowed,
    /// never auto-retried.
    #[error("persistence error: {0}")]
    Persistence(String),
    /// An operation was attempted from a workflow state that does not
    /// permit it, including re-entrant confirm while a write is in flight.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeeError>;
