//! Shared application state.

use std::sync::{Arc, Mutex};

use snowball_core::clock::Clock;
use snowball_core::repository::EventRepository;
use snowball_core::rng::DeterministicRng;
use snowball_game::domain::catalog::ScenarioCatalog;
use snowball_game::domain::config::GameConfig;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for event timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Scenario draws. Locked only around the synchronous domain call.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Event store for sessions and profiles.
    pub event_repository: Arc<dyn EventRepository>,
    /// Content every session is dealt from.
    pub catalog: Arc<ScenarioCatalog>,
    /// Game tuning.
    pub config: Arc<GameConfig>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        event_repository: Arc<dyn EventRepository>,
        catalog: Arc<ScenarioCatalog>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            clock,
            rng,
            event_repository,
            catalog,
            config,
        }
    }
}
