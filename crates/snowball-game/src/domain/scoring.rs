//! Score and elimination tracking.

use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use super::registry::Role;

/// Two-player scoreboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualScores {
    /// Red's points.
    pub red_score: u32,
    /// Blue's points.
    pub blue_score: u32,
    /// Red is knocked out.
    pub red_eliminated: bool,
    /// Blue is knocked out.
    pub blue_eliminated: bool,
}

impl DualScores {
    /// Awards a point unless the role is already out.
    pub(crate) fn credit(&mut self, role: Role) {
        if self.is_eliminated(role) {
            return;
        }
        match role {
            Role::Red => self.red_score += 1,
            Role::Blue => self.blue_score += 1,
        }
    }

    /// Knocks a role out; its score is frozen from here on.
    pub(crate) fn eliminate(&mut self, role: Role) {
        match role {
            Role::Red => self.red_eliminated = true,
            Role::Blue => self.blue_eliminated = true,
        }
    }

    /// Whether `role` has been knocked out.
    #[must_use]
    pub fn is_eliminated(&self, role: Role) -> bool {
        match role {
            Role::Red => self.red_eliminated,
            Role::Blue => self.blue_eliminated,
        }
    }

    /// Points for `role`.
    #[must_use]
    pub fn score(&self, role: Role) -> u32 {
        match role {
            Role::Red => self.red_score,
            Role::Blue => self.blue_score,
        }
    }

    /// Combined points.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.red_score + self.blue_score
    }

    /// Compares scores; elimination order plays no part.
    #[must_use]
    pub fn result(&self) -> MatchResult {
        match self.red_score.cmp(&self.blue_score) {
            std::cmp::Ordering::Greater => MatchResult::Winner(Role::Red),
            std::cmp::Ordering::Less => MatchResult::Winner(Role::Blue),
            std::cmp::Ordering::Equal => MatchResult::Tie,
        }
    }
}

/// End-of-game comparison in two-player mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    /// One role outscored the other.
    Winner(Role),
    /// Equal points.
    Tie,
}

/// Solo score once the failed attempt is taken off the round counter.
#[must_use]
pub fn solo_final_score(round: u32) -> u32 {
    round.saturating_sub(1)
}

/// Title earned by a new high score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    /// Above the advanced threshold.
    Advanced,
    /// Above the star threshold.
    Star,
    /// Above the expert threshold.
    Expert,
}

impl SkillTier {
    /// The highest tier `score` clears, if any.
    #[must_use]
    pub fn for_score(score: u32, config: &GameConfig) -> Option<Self> {
        if score > config.expert_level {
            Some(Self::Expert)
        } else if score > config.star_level {
            Some(Self::Star)
        } else if score > config.advanced_level {
            Some(Self::Advanced)
        } else {
            None
        }
    }
}

/// Score snapshot attached to every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScoreSummary {
    /// Mode not chosen yet.
    Undetermined {
        /// Best solo run on record.
        high_score: u32,
    },
    /// Single player.
    Solo {
        /// Correct responses in the current (or just finished) game.
        streak: u32,
        /// Best solo run on record.
        high_score: u32,
    },
    /// Two players.
    Dual {
        /// Red's points.
        red_score: u32,
        /// Blue's points.
        blue_score: u32,
        /// Red is knocked out.
        red_eliminated: bool,
        /// Blue is knocked out.
        blue_eliminated: bool,
    },
}

impl ScoreSummary {
    /// Builds the two-player variant from a scoreboard.
    #[must_use]
    pub fn dual(scores: &DualScores) -> Self {
        Self::Dual {
            red_score: scores.red_score,
            blue_score: scores.blue_score,
            red_eliminated: scores.red_eliminated,
            blue_eliminated: scores.blue_eliminated,
        }
    }
}
