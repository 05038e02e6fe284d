//! Domain events for the game session context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snowball_core::event::{DomainEvent, EventMetadata};
use uuid::Uuid;

use super::catalog::DealtScenario;
use super::registry::{GadgetId, Role};
use super::round::GameMode;
use super::scoring::MatchResult;

/// Emitted when a session opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLaunched {
    /// The session identifier.
    pub session_id: Uuid,
    /// The player whose profile seeded the high score.
    pub player_id: Uuid,
    /// Best solo score at launch.
    pub high_score: u32,
    /// Digest of the catalog the session was dealt from.
    pub catalog_digest: String,
}

/// Emitted for every button press or timer expiry the session sees, so the
/// next press is measured from it. Suppressed presses are recorded too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GadgetEventObserved {
    /// Timestamp reported with the press or timeout.
    pub at: DateTime<Utc>,
}

/// Emitted when a controller takes a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonRegistered {
    /// The role it plays.
    pub role: Role,
    /// The controller.
    pub gadget_id: GadgetId,
}

/// Emitted when the mode is settled and the opening scenario is dealt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStarted {
    /// Solo or dual.
    pub mode: GameMode,
    /// First scenario.
    pub opening: DealtScenario,
}

/// Emitted after a correct response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundAdvanced {
    /// The role awarded a point, in two-player games.
    pub credited: Option<Role>,
    /// The scenario dealt next.
    pub next: DealtScenario,
}

/// Emitted when a role is knocked out of a two-player game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEliminated {
    /// The role knocked out.
    pub role: Role,
    /// The scenario dealt to the remaining player, if play continues.
    pub next: Option<DealtScenario>,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Threw when no throw was wanted.
    Trouble,
    /// Let a good target get away.
    TooLate,
    /// Both players knocked out.
    AllEliminated,
}

/// Scores when a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FinalTally {
    /// Solo streak.
    Solo {
        /// Correct responses in a row.
        final_score: u32,
    },
    /// Two-player scoreboard.
    Dual {
        /// Red's points.
        red_score: u32,
        /// Blue's points.
        blue_score: u32,
        /// Winner or tie.
        result: MatchResult,
    },
}

/// Emitted when a game ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnded {
    /// What ended it.
    pub reason: EndReason,
    /// The scores.
    pub tally: FinalTally,
}

/// Emitted when a solo score beats the session's high score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreBeaten {
    /// The new best.
    pub score: u32,
}

/// Emitted on "start over".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReset {
    /// The opening scenario, when the mode is already known.
    pub opening: Option<DealtScenario>,
}

/// Emitted when the session is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStopped {
    /// Solo score banked by stopping mid-game.
    pub final_score: Option<u32>,
}

/// Event type identifier for [`SessionLaunched`].
pub const SESSION_LAUNCHED_EVENT_TYPE: &str = "game.session_launched";

/// Event type identifier for [`GadgetEventObserved`].
pub const GADGET_EVENT_OBSERVED_EVENT_TYPE: &str = "game.gadget_event_observed";

/// Event type identifier for [`ButtonRegistered`].
pub const BUTTON_REGISTERED_EVENT_TYPE: &str = "game.button_registered";

/// Event type identifier for [`GameStarted`].
pub const GAME_STARTED_EVENT_TYPE: &str = "game.game_started";

/// Event type identifier for [`RoundAdvanced`].
pub const ROUND_ADVANCED_EVENT_TYPE: &str = "game.round_advanced";

/// Event type identifier for [`PlayerEliminated`].
pub const PLAYER_ELIMINATED_EVENT_TYPE: &str = "game.player_eliminated";

/// Event type identifier for [`GameEnded`].
pub const GAME_ENDED_EVENT_TYPE: &str = "game.game_ended";

/// Event type identifier for [`HighScoreBeaten`].
pub const HIGH_SCORE_BEATEN_EVENT_TYPE: &str = "game.high_score_beaten";

/// Event type identifier for [`GameReset`].
pub const GAME_RESET_EVENT_TYPE: &str = "game.game_reset";

/// Event type identifier for [`SessionStopped`].
pub const SESSION_STOPPED_EVENT_TYPE: &str = "game.session_stopped";

/// Event type identifier for [`HighScoreRaised`].
pub const HIGH_SCORE_RAISED_EVENT_TYPE: &str = "profile.high_score_raised";

/// Event payload variants for a game session stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventKind {
    /// The session opened.
    SessionLaunched(SessionLaunched),
    /// A press reached the debouncer.
    GadgetEventObserved(GadgetEventObserved),
    /// A controller took a role.
    ButtonRegistered(ButtonRegistered),
    /// A game started.
    GameStarted(GameStarted),
    /// A round was won.
    RoundAdvanced(RoundAdvanced),
    /// A role was knocked out.
    PlayerEliminated(PlayerEliminated),
    /// The game ended.
    GameEnded(GameEnded),
    /// A new best solo score.
    HighScoreBeaten(HighScoreBeaten),
    /// The game was restarted.
    GameReset(GameReset),
    /// The session was stopped.
    SessionStopped(SessionStopped),
}

impl GameEventKind {
    /// The stored type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionLaunched(_) => SESSION_LAUNCHED_EVENT_TYPE,
            Self::GadgetEventObserved(_) => GADGET_EVENT_OBSERVED_EVENT_TYPE,
            Self::ButtonRegistered(_) => BUTTON_REGISTERED_EVENT_TYPE,
            Self::GameStarted(_) => GAME_STARTED_EVENT_TYPE,
            Self::RoundAdvanced(_) => ROUND_ADVANCED_EVENT_TYPE,
            Self::PlayerEliminated(_) => PLAYER_ELIMINATED_EVENT_TYPE,
            Self::GameEnded(_) => GAME_ENDED_EVENT_TYPE,
            Self::HighScoreBeaten(_) => HIGH_SCORE_BEATEN_EVENT_TYPE,
            Self::GameReset(_) => GAME_RESET_EVENT_TYPE,
            Self::SessionStopped(_) => SESSION_STOPPED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for a game session stream.
#[derive(Debug, Clone)]
pub struct GameEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: GameEventKind,
}

impl DomainEvent for GameEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Derived Serialize on plain data never fails; Null is unreachable.
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

/// Emitted when a player's best solo score goes up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRaised {
    /// The player.
    pub player_id: Uuid,
    /// The new best.
    pub high_score: u32,
}

/// Event payload variants for a player profile stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileEventKind {
    /// The best score went up.
    HighScoreRaised(HighScoreRaised),
}

/// Domain event envelope for a player profile stream.
#[derive(Debug, Clone)]
pub struct ProfileEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ProfileEventKind,
}

impl DomainEvent for ProfileEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            ProfileEventKind::HighScoreRaised(_) => HIGH_SCORE_RAISED_EVENT_TYPE,
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
