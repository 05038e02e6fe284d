//! Clock abstraction for determinism.

use chrono::{DateTime, Utc};

/// Source of "now" for event timestamps.
///
/// Input timestamps come from the hosting layer; the clock only stamps the
/// events the game records.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
