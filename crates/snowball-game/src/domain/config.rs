//! Per-invocation game tuning.

use serde::{Deserialize, Serialize};

/// Tuning values threaded through every turn.
///
/// Nothing here is mutated during play; the hosting layer builds one value and
/// passes it by reference into each command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Minimum gap, in seconds, between accepted presses once both buttons are
    /// registered. Before that the threshold is zero.
    pub dual_debounce_secs: u32,
    /// How long the input window stays open while buttons are being set up.
    pub registration_window_ms: u32,
    /// Extra time added to every scenario window in two-player games.
    pub dual_window_extension_ms: u32,
    /// Final scores at or below this get an instructions reminder instead of
    /// a streak summary.
    pub min_score: u32,
    /// Scores above this earn the "advanced" title.
    pub advanced_level: u32,
    /// Scores above this earn the "star" title.
    pub star_level: u32,
    /// Scores above this earn the "expert" title.
    pub expert_level: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            dual_debounce_secs: 3,
            registration_window_ms: 60_000,
            dual_window_extension_ms: 8_000,
            min_score: 2,
            advanced_level: 5,
            star_level: 12,
            expert_level: 20,
        }
    }
}
