//! Error types for the mediatheque core

use thiserror::Error;

/// Main domain error type.
///
/// Every business-rule violation is a recoverable variant carrying a
/// human-readable reason; callers decide whether to retry or abort.
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Duplicate loan: {0}")]
    DuplicateLoan(String),

    #[error("Out of stock: {0}")]
    OutOfStock(String),

    #[error("Loan limit exceeded: {0}")]
    LoanLimitExceeded(String),

    #[error("Already returned: {0}")]
    AlreadyReturned(String),

    #[error("Invalid actor: {0}")]
    InvalidActor(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persisted data missing: {0}")]
    PersistenceMissing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;
