//! JSON-lines request handling.
//!
//! Each line read is one [`Request`]; each line written is one [`Response`].
//! Domain failures and malformed lines become `error` responses and the loop
//! keeps going. Only I/O failures stop it.

use serde::{Deserialize, Serialize};
use snowball_core::command::Command;
use snowball_core::error::DomainError;
use snowball_game::application::query_handlers::{GameSessionView, PlayerProfileView};
use snowball_game::application::{command_handlers, query_handlers};
use snowball_game::domain::commands::{InputEvent, LaunchSession, SubmitInput};
use snowball_game::domain::lights::{AnimationStep, ColorState, LightHint};
use snowball_game::domain::outcome::Outcome;
use snowball_game::domain::registry::Role;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// One request line.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    /// Open a new session for a player.
    Launch {
        /// The player starting the session.
        player_id: Uuid,
    },
    /// Feed one input into a running session.
    Input {
        /// The session receiving the input.
        session_id: Uuid,
        /// The input itself.
        input: InputEvent,
    },
    /// Read a session's current state.
    Session {
        /// The session to read.
        session_id: Uuid,
    },
    /// Read a player's profile.
    Profile {
        /// The player to read.
        player_id: Uuid,
    },
}

/// Frames to play on one role's button.
#[derive(Debug, Serialize)]
pub struct LightFrames {
    /// Whose button.
    pub role: Role,
    /// The color state the frames render.
    pub color: ColorState,
    /// The animation, in order.
    pub frames: Vec<AnimationStep>,
}

impl From<&LightHint> for LightFrames {
    fn from(hint: &LightHint) -> Self {
        Self {
            role: hint.role,
            color: hint.color,
            frames: hint.color.animation(),
        }
    }
}

/// One response line.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// A command was handled.
    Outcome {
        /// The session the command ran against.
        session_id: Uuid,
        /// IDs of the domain events produced and persisted.
        event_ids: Vec<Uuid>,
        /// What to tell the players.
        outcome: Outcome,
        /// The outcome's light hints expanded into animation frames.
        light_frames: Vec<LightFrames>,
    },
    /// Result of a session query.
    Session(GameSessionView),
    /// Result of a profile query.
    Profile(PlayerProfileView),
    /// The request failed.
    Error(ErrorBody),
}

/// Runs a parsed request against the game.
///
/// # Errors
///
/// Returns the `DomainError` raised by the command or query handler.
pub async fn dispatch(state: &AppState, request: Request) -> Result<Response, DomainError> {
    match request {
        Request::Launch { player_id } => launch(state, player_id).await,
        Request::Input { session_id, input } => submit_input(state, session_id, input).await,
        Request::Session { session_id } => get_session(state, session_id).await,
        Request::Profile { player_id } => get_profile(state, player_id).await,
    }
}

#[instrument(skip(state))]
async fn launch(state: &AppState, player_id: Uuid) -> Result<Response, DomainError> {
    let command = LaunchSession {
        correlation_id: Uuid::new_v4(),
        player_id,
    };

    log_command(&command);

    let result = command_handlers::handle_launch_session(
        &command,
        &state.catalog,
        &state.config,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(outcome_response(result))
}

#[instrument(skip(state, input), fields(kind = ?input.kind))]
async fn submit_input(
    state: &AppState,
    session_id: Uuid,
    input: InputEvent,
) -> Result<Response, DomainError> {
    let command = SubmitInput {
        correlation_id: Uuid::new_v4(),
        session_id,
        input,
    };

    log_command(&command);

    let result = command_handlers::handle_submit_input(
        &command,
        &state.catalog,
        &state.config,
        state.clock.as_ref(),
        &state.rng,
        &*state.event_repository,
    )
    .await?;

    Ok(outcome_response(result))
}

#[instrument(skip(state))]
async fn get_session(state: &AppState, session_id: Uuid) -> Result<Response, DomainError> {
    let view = query_handlers::get_session_by_id(session_id, &*state.event_repository).await?;
    Ok(Response::Session(view))
}

#[instrument(skip(state))]
async fn get_profile(state: &AppState, player_id: Uuid) -> Result<Response, DomainError> {
    let view = query_handlers::get_profile_by_id(player_id, &*state.event_repository).await?;
    Ok(Response::Profile(view))
}

fn log_command(command: &dyn Command) {
    info!(
        correlation_id = %command.correlation_id(),
        command_type = command.command_type(),
        "handling command"
    );
}

fn outcome_response(result: command_handlers::GameCommandResult) -> Response {
    let light_frames = result.outcome.lights.iter().map(LightFrames::from).collect();
    Response::Outcome {
        session_id: result.session_id,
        event_ids: result.stored_events.iter().map(|e| e.event_id).collect(),
        outcome: result.outcome,
        light_frames,
    }
}

/// Parses and runs one request line. Never fails: problems come back as an
/// `error` response.
pub async fn handle_line(state: &AppState, line: &str) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed request line");
            return Response::Error(ErrorBody::bad_request(format!("malformed request: {e}")));
        }
    };

    match dispatch(state, request).await {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "request failed");
            Response::Error(ErrorBody::from(&err))
        }
    }
}

/// Reads requests from `reader` until end of input, writing one response per
/// non-blank line to `writer`.
///
/// # Errors
///
/// Returns `AppError::Io` if reading or writing fails, and
/// `AppError::Encode` if a response cannot be serialized.
pub async fn serve<R, W>(state: &AppState, reader: R, mut writer: W) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(state, &line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }
    debug!("input closed");
    Ok(())
}
