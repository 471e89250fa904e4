//! Cuckoo Collections - deterministic container library
//!
//! Growable sequences and a cuckoo-hashed set, both driven by a seeded
//! xorshift128+ generator.
//!
//! # Architecture
//!
//! - **preconditions**: Fail-fast argument/index/state checks and the error taxonomy
//! - **rng**: xorshift128+ engine, `RandomSource` capability, per-thread shared engine
//! - **collect**: `DynamicArray` and `CuckooHashSet`
//! - **config**: Serde-backed construction parameters and debug tracing switch
//!
//! # Critical Invariants
//!
//! 1. Set capacity is always a power of two
//! 2. A set never holds two equal keys
//! 3. All randomness goes through a `RandomSource` (seedable, replayable)

// Module declarations
pub mod collect;
pub mod config;
pub mod preconditions;
pub mod rng;

// Re-exports for convenience
pub use collect::{
    array::{ArrayCursor, DynamicArray, SameInstance, Select},
    cuckoo_set::{CuckooHashSet, DefaultHashBuilder, SetCursor, SetIter},
};
pub use config::{ArrayConfig, ConfigError, SetConfig};
pub use preconditions::CollectionError;
pub use rng::{reseed_shared, RandomSource, RngError, SharedRandom, XorShift128Plus};
