//! Commands for the game session context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snowball_core::command::Command;
use uuid::Uuid;

use super::registry::GadgetId;

/// Command to open a new session for a player.
#[derive(Debug, Clone)]
pub struct LaunchSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player whose best score is carried into the session.
    pub player_id: Uuid,
}

impl Command for LaunchSession {
    fn command_type(&self) -> &'static str {
        "game.launch_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to feed one input into a running session.
#[derive(Debug, Clone)]
pub struct SubmitInput {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session receiving the input.
    pub session_id: Uuid,
    /// The input itself.
    pub input: InputEvent,
}

impl Command for SubmitInput {
    fn command_type(&self) -> &'static str {
        "game.submit_input"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Spoken input, already classified by the hosting layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Utterance {
    /// "yes"
    Affirm,
    /// "no"
    Decline,
    /// The spoken throw word.
    Throw,
    /// A request for the rules.
    Help,
    /// Anything else.
    Unrecognized,
}

/// The kind of an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// A controller was pressed; `source_id` names it.
    ButtonPressed,
    /// The input window closed without a press.
    Timeout,
    /// "start over"
    Reset,
    /// "stop"
    Stop,
    /// Something was said.
    Voice(Utterance),
}

/// One inbound event as reported by the hosting layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    /// What happened.
    pub kind: InputKind,
    /// Which controller, for button presses.
    #[serde(default)]
    pub source_id: Option<GadgetId>,
    /// When the hosting layer saw it.
    pub timestamp: DateTime<Utc>,
}

impl InputEvent {
    /// A press from `source_id`.
    #[must_use]
    pub fn press(source_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: InputKind::ButtonPressed,
            source_id: Some(GadgetId::new(source_id)),
            timestamp,
        }
    }

    /// Any input that carries no controller.
    #[must_use]
    pub fn of(kind: InputKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            source_id: None,
            timestamp,
        }
    }

    /// Something said.
    #[must_use]
    pub fn voice(utterance: Utterance, timestamp: DateTime<Utc>) -> Self {
        Self::of(InputKind::Voice(utterance), timestamp)
    }
}
