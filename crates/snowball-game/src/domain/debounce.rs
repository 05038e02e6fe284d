//! Press debouncing by inter-event gap.
//!
//! A single physical press can reach the game more than once. Presses that
//! arrive too close to the previous gadget event (a press or a timer expiry)
//! are dropped without touching the game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gap assumed when a press is timestamped before the previous one.
/// Larger than any configured threshold, so such presses are always accepted.
pub const FALLBACK_GAP_MS: i64 = 100_000;

/// Whether a press survives debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressGap {
    /// Far enough from the previous press.
    Accepted,
    /// Too close; drop silently and keep listening.
    Suppressed,
}

/// Remembers when the last gadget event was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debouncer {
    last_event: Option<DateTime<Utc>>,
}

impl Debouncer {
    /// Milliseconds since the last gadget event, `None` if there was none.
    /// Negative gaps are replaced by [`FALLBACK_GAP_MS`].
    #[must_use]
    pub fn gap_ms(&self, at: DateTime<Utc>) -> Option<i64> {
        let last = self.last_event?;
        let gap = (at - last).num_milliseconds();
        Some(if gap < 0 { FALLBACK_GAP_MS } else { gap })
    }

    /// Judges a press against `threshold_secs`. Accepts only when the gap is
    /// strictly greater than the threshold.
    #[must_use]
    pub fn evaluate(&self, at: DateTime<Utc>, threshold_secs: u32) -> PressGap {
        match self.gap_ms(at) {
            None => PressGap::Accepted,
            Some(gap) if gap > i64::from(threshold_secs) * 1_000 => PressGap::Accepted,
            Some(_) => PressGap::Suppressed,
        }
    }

    /// Records a press (accepted or not) or a timer expiry.
    pub(crate) fn observe(&mut self, at: DateTime<Utc>) {
        self.last_event = Some(at);
    }

    /// Timestamp of the last gadget event.
    #[must_use]
    pub fn last_event(&self) -> Option<DateTime<Utc>> {
        self.last_event
    }
}
