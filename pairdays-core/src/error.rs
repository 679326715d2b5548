//! Error types for pairdays.

use thiserror::Error;

/// Errors that can occur in pairdays operations.
#[derive(Error, Debug)]
pub enum PairDaysError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Human-readable rejection passed through from the backend
    /// (validation, permission or network failure).
    #[error("{0}")]
    Gateway(String),

    /// The auth service refused the credentials or the refresh token.
    #[error("{0}")]
    AuthRejected(String),

    #[error("Not signed in. Run `pairdays login` first")]
    NotSignedIn,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PairDaysError {
    fn from(e: serde_json::Error) -> Self {
        PairDaysError::Serialization(e.to_string())
    }
}

/// Result type alias for pairdays operations.
pub type PairDaysResult<T> = Result<T, PairDaysError>;
