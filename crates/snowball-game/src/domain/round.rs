//! Round engine: session stages and the verdict on each in-round signal.

use serde::{Deserialize, Serialize};

use super::catalog::DealtScenario;
use super::registry::Role;

/// How many players are in the game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Not decided yet.
    #[default]
    Undetermined,
    /// One player, one button or voice.
    Solo,
    /// Two players, two buttons.
    Dual,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No launch event recorded yet.
    #[default]
    Unlaunched,
    /// Waiting for the first button, or a spoken yes/no.
    AwaitingRegistration,
    /// Red is registered; a second button starts a two-player game, "no"
    /// starts a solo one.
    AwaitingModeChoice,
    /// A scenario is outstanding.
    InRound,
    /// The game ended; only reset or stop make progress.
    GameOver,
    /// The session was stopped and is closed for good.
    Stopped,
}

impl Stage {
    /// True while buttons or the mode are still being set up.
    #[must_use]
    pub fn is_setup(self) -> bool {
        matches!(self, Self::AwaitingRegistration | Self::AwaitingModeChoice)
    }
}

/// The outstanding scenario and the round ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// Scenario being played, once a game has started.
    pub scenario: Option<DealtScenario>,
    /// 1-based round counter. In solo play this is the streak plus the
    /// attempt in progress; after a failure it holds the final score.
    pub round: u32,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            scenario: None,
            round: 1,
        }
    }
}

impl RoundState {
    /// A fresh round counter playing `opening`.
    #[must_use]
    pub fn starting_with(opening: Option<DealtScenario>) -> Self {
        Self {
            scenario: opening,
            round: 1,
        }
    }

    /// Whether the outstanding scenario wants a throw.
    #[must_use]
    pub fn reaction_required(&self) -> bool {
        self.scenario.is_some_and(|s| s.requires_reaction)
    }

    /// Moves to the next round.
    pub(crate) fn advance(&mut self, next: DealtScenario) {
        self.round += 1;
        self.scenario = Some(next);
    }

    /// Replaces the scenario without counting a round.
    pub(crate) fn deal(&mut self, next: DealtScenario) {
        self.scenario = Some(next);
    }
}

/// What reached the round engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A role threw.
    Action(Role),
    /// The scenario clock ran out without a throw.
    Timeout,
}

/// How a signal resolved the outstanding scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Threw when a throw was wanted.
    GoodHit(Role),
    /// Let the clock run out when no throw was wanted.
    HeldFire,
    /// Threw when no throw was wanted.
    Trouble(Role),
    /// Let the clock run out when a throw was wanted.
    TooLate,
}

impl Verdict {
    /// True for the two correct responses.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::GoodHit(_) | Self::HeldFire)
    }
}

/// Judges a signal against the outstanding scenario.
#[must_use]
pub fn judge(reaction_required: bool, signal: Signal) -> Verdict {
    match (signal, reaction_required) {
        (Signal::Action(role), true) => Verdict::GoodHit(role),
        (Signal::Action(role), false) => Verdict::Trouble(role),
        (Signal::Timeout, true) => Verdict::TooLate,
        (Signal::Timeout, false) => Verdict::HeldFire,
    }
}
