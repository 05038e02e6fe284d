//! Test repositories — mock `EventRepository` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use snowball_core::error::DomainError;
use snowball_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// An event repository that serves pre-seeded streams and records every
/// append. Appends are not folded back into the streams, so each test sees
/// exactly the history it seeded.
#[derive(Debug, Default)]
pub struct RecordingEventRepository {
    streams: Mutex<HashMap<Uuid, Vec<StoredEvent>>>,
    appended: Mutex<Vec<(Uuid, i64, Vec<StoredEvent>)>>,
}

impl RecordingEventRepository {
    /// Create an empty recording repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the history returned for `aggregate_id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_stream(self, aggregate_id: Uuid, events: Vec<StoredEvent>) -> Self {
        self.streams.lock().unwrap().insert(aggregate_id, events);
        self
    }

    /// Returns a snapshot of all appends as `(stream, expected_version, events)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.appended.lock().unwrap().clone()
    }

    /// Returns the appends made to one stream.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_to(&self, aggregate_id: Uuid) -> Vec<StoredEvent> {
        self.appended
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, _)| *id == aggregate_id)
            .flat_map(|(_, _, events)| events.clone())
            .collect()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self
            .streams
            .lock()
            .unwrap()
            .get(&aggregate_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }
}

/// An event repository that always returns an empty event list and silently
/// accepts appends. Useful for "not found" scenarios and launch commands.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

/// An event repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
