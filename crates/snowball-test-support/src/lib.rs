//! Shared test fakes and utilities for the Snowball Fight game engine.

mod clock;
mod repository;
mod rng;

pub use clock::{FixedClock, fixed_now};
pub use repository::{EmptyEventRepository, FailingEventRepository, RecordingEventRepository};
pub use rng::{MockRng, SequenceRng};
