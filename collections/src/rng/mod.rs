//! Deterministic random number generation
//!
//! Uses the xorshift128+ algorithm for fast, seedable random number generation.
//! CRITICAL: All container randomness (shuffles, random picks, cuckoo evictions)
//! MUST go through a [`RandomSource`] so runs can be replayed from a seed.

mod shared;
mod xorshift;

pub use shared::{reseed_shared, with_shared, SharedRandom};
pub use xorshift::{RngError, XorShift128Plus};

/// Capability to sample a uniform index in `[0, bound)`.
///
/// Containers only ever need this one operation, so tests can substitute a
/// scripted sequence for the real engine.
pub trait RandomSource {
    /// Uniform value in `[0, bound)`. A `bound` of 0 or 1 yields 0.
    fn next_index(&mut self, bound: usize) -> usize;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_index(&mut self, bound: usize) -> usize {
        (**self).next_index(bound)
    }
}
