//! Command handlers for the game session context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load aggregate, execute command, persist events.

use std::sync::Mutex;

use snowball_core::aggregate::AggregateRoot;
use snowball_core::clock::Clock;
use snowball_core::error::DomainError;
use snowball_core::repository::{EventRepository, StoredEvent};
use snowball_core::rng::DeterministicRng;
use tracing::info;
use uuid::Uuid;

use crate::domain::aggregates::{GameSession, PlayerProfile, TurnContext};
use crate::domain::catalog::ScenarioCatalog;
use crate::domain::commands::{LaunchSession, SubmitInput};
use crate::domain::config::GameConfig;
use crate::domain::events::{GameEvent, GameEventKind, ProfileEvent, ProfileEventKind};
use crate::domain::outcome::Outcome;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct GameCommandResult {
    /// The session the command ran against.
    pub session_id: Uuid,
    /// What to tell the players.
    pub outcome: Outcome,
    /// The session events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
}

fn decode<K: serde::de::DeserializeOwned>(stored: &StoredEvent) -> Result<K, DomainError> {
    serde_json::from_value(stored.payload.clone())
        .map_err(|e| DomainError::Infrastructure(format!("event deserialization failed: {e}")))
}

/// Reconstitutes a `GameSession` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    session_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<GameSession, DomainError> {
    let mut session = GameSession::new(session_id);
    for stored in existing_events {
        let kind: GameEventKind = decode(stored)?;
        session.apply(&GameEvent {
            metadata: stored.metadata(),
            kind,
        });
    }
    Ok(session)
}

/// Reconstitutes a `PlayerProfile` from stored events. An empty stream is a
/// player with no record yet.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute_profile(
    player_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<PlayerProfile, DomainError> {
    let mut profile = PlayerProfile::new(player_id);
    for stored in existing_events {
        let kind: ProfileEventKind = decode(stored)?;
        profile.apply(&ProfileEvent {
            metadata: stored.metadata(),
            kind,
        });
    }
    Ok(profile)
}

fn to_stored_events<A: AggregateRoot>(aggregate: &A) -> Vec<StoredEvent> {
    aggregate
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_domain)
        .collect()
}

/// Handles the `LaunchSession` command: reads the player's profile, opens a
/// new session stream, and persists the launch event.
///
/// # Errors
///
/// Returns `DomainError` if event loading or appending fails.
pub async fn handle_launch_session(
    command: &LaunchSession,
    catalog: &ScenarioCatalog,
    config: &GameConfig,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<GameCommandResult, DomainError> {
    let profile_events = repo.load_events(command.player_id).await?;
    let profile = reconstitute_profile(command.player_id, &profile_events)?;

    let session_id = Uuid::new_v4();
    let mut session = GameSession::new(session_id);
    let outcome = session.launch(
        command.player_id,
        profile.high_score(),
        catalog,
        config,
        command.correlation_id,
        clock,
    )?;

    let stored_events = to_stored_events(&session);
    repo.append_events(session_id, session.version(), &stored_events)
        .await?;

    Ok(GameCommandResult {
        session_id,
        outcome,
        stored_events,
    })
}

/// Handles the `SubmitInput` command: reconstitutes the session, runs the
/// input through the game, persists the resulting events, and raises the
/// player's profile high score when the session beat it.
///
/// The `Mutex` is locked only around the synchronous domain method call to
/// avoid holding a `MutexGuard` across await points.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the session has no events, and
/// otherwise any error from the domain or the repository.
pub async fn handle_submit_input(
    command: &SubmitInput,
    catalog: &ScenarioCatalog,
    config: &GameConfig,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    repo: &dyn EventRepository,
) -> Result<GameCommandResult, DomainError> {
    let existing_events = repo.load_events(command.session_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(command.session_id));
    }
    let mut session = reconstitute(command.session_id, &existing_events)?;

    let ctx = TurnContext {
        catalog,
        config,
        clock,
        correlation_id: command.correlation_id,
    };
    // Lock RNG only for the synchronous domain method, never across an await.
    let outcome = {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        session.handle_input(&command.input, &ctx, &mut *rng_guard)?
    };

    let stored_events = to_stored_events(&session);
    repo.append_events(command.session_id, session.version(), &stored_events)
        .await?;

    if let (Some(score), Some(player_id)) = (session.new_high_score(), session.player_id()) {
        raise_profile_high_score(player_id, score, command.correlation_id, clock, repo).await?;
    }

    Ok(GameCommandResult {
        session_id: command.session_id,
        outcome,
        stored_events,
    })
}

async fn raise_profile_high_score(
    player_id: Uuid,
    score: u32,
    correlation_id: Uuid,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<(), DomainError> {
    let existing_events = repo.load_events(player_id).await?;
    let mut profile = reconstitute_profile(player_id, &existing_events)?;
    if !profile.raise_high_score(score, correlation_id, clock) {
        return Ok(());
    }

    let stored_events = to_stored_events(&profile);
    repo.append_events(player_id, profile.version(), &stored_events)
        .await?;
    info!(%player_id, high_score = score, "profile high score raised");
    Ok(())
}
