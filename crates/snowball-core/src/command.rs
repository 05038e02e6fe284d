//! Command abstractions.

use uuid::Uuid;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted command name used in logs, e.g. `game.submit_input`.
    fn command_type(&self) -> &'static str;

    /// Correlation ID copied onto every event the command produces.
    fn correlation_id(&self) -> Uuid;
}
