//! Domain model for the game session context.

pub mod aggregates;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod debounce;
pub mod events;
pub mod lights;
pub mod narration;
pub mod outcome;
pub mod registry;
pub mod round;
pub mod scoring;
