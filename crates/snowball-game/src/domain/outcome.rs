//! What the game hands back to the hosting layer after every input.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::lights::LightHint;
use super::registry::Role;
use super::scoring::ScoreSummary;

/// Why a registration press was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationProblem {
    /// The Red button pressed again while waiting for a second one.
    Duplicate,
    /// A third controller.
    Extra,
}

impl fmt::Display for RegistrationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate => f.write_str("button already registered"),
            Self::Extra => f.write_str("two buttons already registered"),
        }
    }
}

/// Input the game understood but refused. The session stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputRejection {
    /// Duplicate or extra controller during registration.
    #[error("invalid registration: {problem}")]
    InvalidRegistration {
        /// What was wrong with the press.
        problem: RegistrationProblem,
    },

    /// A throw after the game ended.
    #[error("the game has ended")]
    ActionAfterGameOver,

    /// A press from a role that is already knocked out.
    #[error("{role} has been eliminated")]
    EliminatedRole {
        /// The knocked-out role.
        role: Role,
    },

    /// A press too close to the previous one.
    #[error("press arrived within the debounce window")]
    Spurious,

    /// Input that means nothing right now.
    #[error("input not understood in this stage")]
    Unrecognized,
}

/// The result of one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// What to say, if anything.
    pub narration: Option<String>,
    /// What to say if the player stays silent.
    pub reprompt: Option<String>,
    /// How long to listen for the next input. `None` leaves whatever window is
    /// already running.
    pub next_input_window_ms: Option<u32>,
    /// A game has ended and awaits reset or stop.
    pub game_over: bool,
    /// The session is finished.
    pub end_session: bool,
    /// Scores after this input.
    pub score: ScoreSummary,
    /// Light changes to apply.
    pub lights: Vec<LightHint>,
    /// Set when the input was refused.
    pub rejection: Option<InputRejection>,
}

impl Outcome {
    /// Says nothing and changes nothing the player can see.
    #[must_use]
    pub fn silent(score: ScoreSummary) -> Self {
        Self {
            narration: None,
            reprompt: None,
            next_input_window_ms: None,
            game_over: false,
            end_session: false,
            score,
            lights: Vec::new(),
            rejection: None,
        }
    }

    /// Speaks `narration`, falling back to `reprompt` on silence.
    #[must_use]
    pub fn spoken(narration: String, reprompt: impl Into<String>, score: ScoreSummary) -> Self {
        Self {
            narration: Some(narration),
            reprompt: Some(reprompt.into()),
            ..Self::silent(score)
        }
    }

    /// Speaks `narration` with nothing to fall back on.
    #[must_use]
    pub fn narrated(narration: String, score: ScoreSummary) -> Self {
        Self {
            narration: Some(narration),
            ..Self::silent(score)
        }
    }

    #[must_use]
    pub(crate) fn with_window(mut self, window_ms: Option<u32>) -> Self {
        self.next_input_window_ms = window_ms;
        self
    }

    #[must_use]
    pub(crate) fn with_lights(mut self, lights: Vec<LightHint>) -> Self {
        self.lights = lights;
        self
    }

    #[must_use]
    pub(crate) fn rejecting(mut self, rejection: InputRejection) -> Self {
        self.rejection = Some(rejection);
        self
    }

    #[must_use]
    pub(crate) fn ending_game(mut self) -> Self {
        self.game_over = true;
        self
    }

    #[must_use]
    pub(crate) fn ending_session(mut self) -> Self {
        self.game_over = true;
        self.end_session = true;
        self.reprompt = None;
        self.next_input_window_ms = None;
        self
    }
}
