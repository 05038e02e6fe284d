//! Button light feedback.
//!
//! The game only says which color state each button should show; turning that
//! into frames is [`ColorState::animation`]'s job, and sending frames to the
//! hardware belongs to the hosting layer.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::registry::Role;

const BREATH_STEPS: u32 = 30;
const BREATH_DURATION_MS: u32 = 1_200;

/// What a button's light should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorState {
    /// Red breathing.
    Red,
    /// Blue breathing.
    Blue,
    /// Dim grey: the role is knocked out.
    Eliminated,
    /// Dark.
    Off,
}

/// One light instruction for one role's button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightHint {
    /// Whose button.
    pub role: Role,
    /// What it should show.
    pub color: ColorState,
}

impl LightHint {
    /// Shorthand constructor.
    #[must_use]
    pub fn new(role: Role, color: ColorState) -> Self {
        Self { role, color }
    }
}

/// 24-bit color. Serializes as `rrggbb` hex, the form light hardware takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Builds a color from `0xRRGGBB`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_hex(hex: u32) -> Self {
        Self(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    fn lerp(self, to: Self, num: u32, den: u32) -> Self {
        let mix = |a: u8, b: u8| -> u8 {
            let (a, b) = (i64::from(a), i64::from(b));
            let v = a + (b - a) * i64::from(num) / i64::from(den);
            u8::try_from(v.clamp(0, 255)).unwrap_or(u8::MAX)
        };
        Self(mix(self.0, to.0), mix(self.1, to.1), mix(self.2, to.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One frame of a light sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnimationStep {
    /// How long the frame lasts.
    pub duration_ms: u32,
    /// Color at the end of the frame.
    pub color: Rgb,
    /// Fade into the color rather than switching.
    pub blend: bool,
}

impl ColorState {
    /// Frames for this state: a breathing loop for the role colors, a single
    /// solid frame otherwise.
    #[must_use]
    pub fn animation(self) -> Vec<AnimationStep> {
        match self {
            Self::Red => breath_animation(Rgb::from_hex(0x55_2200), Rgb::from_hex(0xff_0000)),
            Self::Blue => breath_animation(Rgb::from_hex(0x00_3366), Rgb::from_hex(0x00_00ff)),
            Self::Eliminated => vec![solid(Rgb::from_hex(0x33_3333))],
            Self::Off => vec![solid(Rgb::from_hex(0x00_0000))],
        }
    }
}

fn solid(color: Rgb) -> AnimationStep {
    AnimationStep {
        duration_ms: BREATH_DURATION_MS,
        color,
        blend: false,
    }
}

/// Fades `from → to → from` in 30 frames over 1.2 seconds.
#[must_use]
pub fn breath_animation(from: Rgb, to: Rgb) -> Vec<AnimationStep> {
    let half = BREATH_STEPS / 2;
    let duration_ms = BREATH_DURATION_MS / BREATH_STEPS;
    (1..=BREATH_STEPS)
        .map(|step| {
            let color = if step <= half {
                from.lerp(to, step, half)
            } else {
                from.lerp(to, BREATH_STEPS - step, half)
            };
            AnimationStep {
                duration_ms,
                color,
                blend: true,
            }
        })
        .collect()
}
