//! Random number generator abstraction for determinism.
//!
//! Production code draws from [`SystemRng`]. Tests and replays inject a
//! scripted implementation so the dealt scenarios are known in advance.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Draw a uniform index in `0..len`.
    ///
    /// Returns `None` when `len` is zero or does not fit in a `u32`.
    fn next_index(&mut self, len: usize) -> Option<usize> {
        let upper = u32::try_from(len).ok()?.checked_sub(1)?;
        usize::try_from(self.next_u32_range(0, upper)).ok()
    }
}

/// Production RNG seeded from the operating system.
#[derive(Debug)]
pub struct SystemRng(StdRng);

impl SystemRng {
    /// Creates an RNG seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Creates an RNG with a fixed seed, for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.random_range(min..=max)
    }
}
