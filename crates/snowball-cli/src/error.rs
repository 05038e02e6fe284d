//! Snowball Fight — host error types.

use serde::Serialize;
use snowball_core::error::DomainError;
use snowball_game::domain::catalog::CatalogError;
use thiserror::Error;

/// Startup and I/O errors for the session host.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The scenario catalog could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Reading requests or writing responses failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be encoded.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorBody {
    /// A request line that could not be parsed.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "bad_request",
            message: message.into(),
        }
    }
}

impl From<&DomainError> for ErrorBody {
    fn from(err: &DomainError) -> Self {
        let error = match err {
            DomainError::AggregateNotFound(_) => "aggregate_not_found",
            DomainError::ConcurrencyConflict { .. } => "concurrency_conflict",
            DomainError::Validation(_) => "validation_error",
            DomainError::SessionClosed(_) => "session_closed",
            DomainError::Infrastructure(_) => "infrastructure_error",
        };
        Self {
            error,
            message: err.to_string(),
        }
    }
}
