//! In-memory implementation of the `EventRepository` trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use snowball_core::error::DomainError;
use snowball_core::repository::{EventRepository, StoredEvent};

/// Event repository holding every stream in a map guarded by a `RwLock`.
///
/// The lock is only held for the synchronous map access, never across an
/// await point.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: RwLock<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl InMemoryEventRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams that have at least one event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn stream_count(&self) -> Result<usize, DomainError> {
        let streams = self
            .streams
            .read()
            .map_err(|e| DomainError::Infrastructure(format!("event store lock poisoned: {e}")))?;
        Ok(streams.len())
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self
            .streams
            .read()
            .map_err(|e| DomainError::Infrastructure(format!("event store lock poisoned: {e}")))?;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut streams = self
            .streams
            .write()
            .map_err(|e| DomainError::Infrastructure(format!("event store lock poisoned: {e}")))?;
        let actual = streams
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map_or(0, |e| e.sequence_number);

        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        let mut next = expected_version;
        for event in events {
            next += 1;
            if event.aggregate_id != aggregate_id || event.sequence_number != next {
                return Err(DomainError::Validation(format!(
                    "event {} is out of sequence for stream {aggregate_id}",
                    event.event_id
                )));
            }
        }

        streams
            .entry(aggregate_id)
            .or_default()
            .extend_from_slice(events);
        debug!(%aggregate_id, appended = events.len(), version = next, "events appended");
        Ok(())
    }
}
