//! Snowball Fight — game session bounded context.
//!
//! Responsible for the spoken snowball-fight game: registering push-button
//! controllers, dealing scenarios, judging throws against the clock, keeping
//! solo streaks and two-player scores, and remembering each player's best run.

pub mod application;
pub mod domain;
