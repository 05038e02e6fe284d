//! Query handlers for the game session context.
//!
//! This module contains query handlers that reconstitute aggregates
//! from stored events and return read-only view DTOs.

use serde::Serialize;
use snowball_core::aggregate::AggregateRoot;
use snowball_core::error::DomainError;
use snowball_core::repository::EventRepository;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::registry::GadgetId;
use crate::domain::round::{GameMode, Stage};
use crate::domain::scoring::ScoreSummary;

/// Read-only view of a game session.
#[derive(Debug, Serialize)]
pub struct GameSessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The player the session belongs to.
    pub player_id: Option<Uuid>,
    /// Lifecycle stage.
    pub stage: Stage,
    /// Solo, dual, or not chosen yet.
    pub mode: GameMode,
    /// Round ordinal.
    pub round: u32,
    /// Catalog index of the scenario in play.
    pub scenario_index: Option<usize>,
    /// Score snapshot.
    pub score: ScoreSummary,
    /// Best solo score known to the session.
    pub high_score: u32,
    /// Controller playing Red.
    pub red_button: Option<GadgetId>,
    /// Controller playing Blue.
    pub blue_button: Option<GadgetId>,
    /// Current version (event count).
    pub version: i64,
}

/// Read-only view of a player profile.
#[derive(Debug, Serialize)]
pub struct PlayerProfileView {
    /// The player identifier.
    pub player_id: Uuid,
    /// Best solo score on record.
    pub high_score: u32,
    /// Current version (event count).
    pub version: i64,
}

/// Retrieves a session by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_session_by_id(
    session_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<GameSessionView, DomainError> {
    let stored_events = repo.load_events(session_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(session_id));
    }
    let session = command_handlers::reconstitute(session_id, &stored_events)?;

    Ok(GameSessionView {
        session_id,
        player_id: session.player_id(),
        stage: session.stage(),
        mode: session.mode(),
        round: session.round().round,
        scenario_index: session.round().scenario.map(|s| s.index),
        score: session.score_summary(),
        high_score: session.high_score(),
        red_button: session.registry().red().cloned(),
        blue_button: session.registry().blue().cloned(),
        version: session.version(),
    })
}

/// Retrieves a player's profile.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the player has no recorded
/// high score yet.
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub async fn get_profile_by_id(
    player_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<PlayerProfileView, DomainError> {
    let stored_events = repo.load_events(player_id).await?;
    if stored_events.is_empty() {
        return Err(DomainError::AggregateNotFound(player_id));
    }
    let profile = command_handlers::reconstitute_profile(player_id, &stored_events)?;

    Ok(PlayerProfileView {
        player_id,
        high_score: profile.high_score(),
        version: profile.version(),
    })
}
