//! Button registry: which physical controller plays which role.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use super::lights::ColorState;
use super::round::GameMode;

/// Opaque hardware identity reported by the hosting layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GadgetId(pub String);

impl GadgetId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for GadgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical player identity, independent of the controller behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// First registered button; the only role in solo play.
    Red,
    /// Second registered button.
    Blue,
}

impl Role {
    /// The opposing role.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }

    /// The light color that identifies this role.
    #[must_use]
    pub fn color(self) -> ColorState {
        match self {
            Self::Red => ColorState::Red,
            Self::Blue => ColorState::Blue,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => f.write_str("Red"),
            Self::Blue => f.write_str("Blue"),
        }
    }
}

/// What a press means given the current registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressResolution {
    /// No button was registered; this one becomes Red.
    FirstRegistered,
    /// A distinct second button; it becomes Blue and the game goes two-player.
    SecondRegistered,
    /// The Red button pressed again while waiting for a second button.
    Duplicate,
    /// A third controller while two are registered.
    Extra,
    /// A gameplay press by a registered role.
    Action(Role),
}

/// Up to two controller assignments.
///
/// Slots only ever go from empty to filled while the session is live; they are
/// released together when the session stops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonRegistry {
    red: Option<GadgetId>,
    blue: Option<GadgetId>,
}

impl ButtonRegistry {
    /// Classifies a press. Pure: the registry is not modified.
    #[must_use]
    pub fn resolve(&self, mode: GameMode, gadget: &GadgetId) -> PressResolution {
        match (&self.red, &self.blue) {
            (None, _) => PressResolution::FirstRegistered,
            (Some(_), None) if mode == GameMode::Solo => PressResolution::Action(Role::Red),
            (Some(red), None) if red == gadget => PressResolution::Duplicate,
            (Some(_), None) => PressResolution::SecondRegistered,
            (Some(red), Some(_)) if red == gadget => PressResolution::Action(Role::Red),
            (Some(_), Some(blue)) if blue == gadget => PressResolution::Action(Role::Blue),
            (Some(_), Some(_)) => PressResolution::Extra,
        }
    }

    /// Fills the slot for `role` if it is still empty.
    pub(crate) fn assign(&mut self, role: Role, gadget: GadgetId) {
        let slot = match role {
            Role::Red => &mut self.red,
            Role::Blue => &mut self.blue,
        };
        if slot.is_none() {
            *slot = Some(gadget);
        }
    }

    /// Forgets both controllers.
    pub(crate) fn release(&mut self) {
        self.red = None;
        self.blue = None;
    }

    /// The controller playing Red.
    #[must_use]
    pub fn red(&self) -> Option<&GadgetId> {
        self.red.as_ref()
    }

    /// The controller playing Blue.
    #[must_use]
    pub fn blue(&self) -> Option<&GadgetId> {
        self.blue.as_ref()
    }

    /// True once both slots are filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.red.is_some() && self.blue.is_some()
    }

    /// True if any controller is registered.
    #[must_use]
    pub fn has_buttons(&self) -> bool {
        self.red.is_some()
    }

    /// Roles that currently have a controller, Red first.
    #[must_use]
    pub fn registered_roles(&self) -> Vec<Role> {
        let mut roles = Vec::with_capacity(2);
        if self.red.is_some() {
            roles.push(Role::Red);
        }
        if self.blue.is_some() {
            roles.push(Role::Blue);
        }
        roles
    }

    /// Debounce threshold in seconds: zero while registering, the configured
    /// gap once two players are set up.
    #[must_use]
    pub fn debounce_threshold_secs(&self, config: &GameConfig) -> u32 {
        if self.is_complete() {
            config.dual_debounce_secs
        } else {
            0
        }
    }
}
