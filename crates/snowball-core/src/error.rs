//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Player mistakes (duplicate buttons, late presses, acting after the game is
/// over) are not errors; they are reported in the game outcome. This enum
/// covers what the hosting layer did wrong or what the infrastructure failed to
/// do.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No events exist for the requested stream.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The stream that had the conflict.
        aggregate_id: Uuid,
        /// The version the writer expected.
        expected: i64,
        /// The version found in the store.
        actual: i64,
    },

    /// The request is malformed or not allowed in the current state.
    #[error("validation error: {0}")]
    Validation(String),

    /// The session was stopped and accepts no further input.
    #[error("session closed: {0}")]
    SessionClosed(Uuid),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
