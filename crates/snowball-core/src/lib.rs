//! Snowball Core — shared domain abstractions.
//!
//! Traits and types every game context builds on: event-sourced aggregates,
//! commands, the event repository seam, and the clock and RNG seams that keep
//! replays deterministic. No infrastructure code lives here.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
pub mod rng;
