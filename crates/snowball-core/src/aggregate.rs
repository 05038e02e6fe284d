//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An event-sourced aggregate: rebuilt by replaying its stream, mutated by
/// recording new events.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate records and replays.
    type Event: DomainEvent;

    /// Returns the stream identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the persisted version (number of replayed events).
    fn version(&self) -> i64;

    /// Replays a persisted event into the in-memory state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the aggregate was loaded.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears recorded events once they are persisted.
    fn clear_uncommitted_events(&mut self);
}
