//! xorshift128+ random number generator
//!
//! Fast 128-bit-state PRNG that is deterministic and suitable for
//! randomized data structures.
//!
//! # Algorithm
//!
//! Two 64-bit words of state. Each step shifts and xors the words together
//! and returns their sum. Seeds are run through the murmur3 64-bit finaliser
//! twice, so low-entropy seeds (0, 1, 2, ...) still give decorrelated states.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. The full state can be read
//! with [`XorShift128Plus::state`] and restored with
//! [`XorShift128Plus::set_state`] for replay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RandomSource;

const NORMALIZER_F64: f64 = 1.0 / (1u64 << 53) as f64;
const NORMALIZER_F32: f64 = 1.0 / (1u64 << 24) as f64;

/// Process-wide counter mixed into entropy seeds so two engines created in
/// the same nanosecond still differ.
static SEED_UNIQUIFIER: AtomicU64 = AtomicU64::new(8_682_522_807_148_012);
const SEED_UNIQUIFIER_STEP: u64 = 181_783_497_276_652_981;

/// Errors that can occur when sampling from the generator
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RngError {
    #[error("Bound must be positive, got {0}")]
    NonPositiveBound(i64),

    #[error("Invalid range: min {min} must be less than max {max}")]
    InvalidRange { min: i64, max: i64 },

    #[error("State words must not both be zero")]
    ZeroState,
}

/// Deterministic random number generator using xorshift128+
///
/// # Example
/// ```
/// use cuckoo_collections::XorShift128Plus;
///
/// let mut rng = XorShift128Plus::new(12345);
/// let value = rng.next_long();
/// let bounded = rng.next_long_below(100).unwrap(); // [0, 100)
/// assert!((0..100).contains(&bounded));
/// # let _ = value;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XorShift128Plus {
    s1: u64,
    s2: u64,
}

impl XorShift128Plus {
    /// Create a new generator from a seed
    ///
    /// A zero seed is replaced by `i64::MIN` before mixing.
    pub fn new(seed: u64) -> Self {
        let mut rng = Self { s1: 0, s2: 0 };
        rng.set_seed(seed);
        rng
    }

    /// Create a generator seeded from the clock and a process-wide counter
    pub fn from_entropy() -> Self {
        let previous = SEED_UNIQUIFIER
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.wrapping_mul(SEED_UNIQUIFIER_STEP))
            })
            .unwrap_or_else(|current| current);
        let unique = previous.wrapping_mul(SEED_UNIQUIFIER_STEP);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(unique ^ nanos)
    }

    /// Re-seed in place
    pub fn set_seed(&mut self, seed: u64) {
        let seed = if seed == 0 { i64::MIN as u64 } else { seed };
        let s1 = murmur_finalize(seed);
        self.s1 = s1;
        self.s2 = murmur_finalize(s1);
    }

    /// Restore a previously captured state
    pub fn set_state(&mut self, s1: u64, s2: u64) -> Result<(), RngError> {
        if s1 == 0 && s2 == 0 {
            return Err(RngError::ZeroState);
        }
        self.s1 = s1;
        self.s2 = s2;
        Ok(())
    }

    /// Current state `(s1, s2)` (for checkpointing/replay)
    pub fn state(&self) -> (u64, u64) {
        (self.s1, self.s2)
    }

    /// Generate the next 64-bit value
    pub fn next_long(&mut self) -> i64 {
        let mut x = self.s1;
        let y = self.s2;
        self.s1 = y;
        x ^= x << 23;
        self.s2 = x ^ y ^ ((x as i64) >> 17) as u64 ^ (y >> 26);
        self.s2.wrapping_add(y) as i64
    }

    /// Uniform value in `[0, n)` without modulo bias
    ///
    /// # Errors
    /// [`RngError::NonPositiveBound`] if `n <= 0`
    pub fn next_long_below(&mut self, n: i64) -> Result<i64, RngError> {
        if n <= 0 {
            return Err(RngError::NonPositiveBound(n));
        }
        Ok(self.bounded(n))
    }

    /// Bias-rejection loop; `n` must be positive.
    fn bounded(&mut self, n: i64) -> i64 {
        loop {
            let bits = ((self.next_long() as u64) >> 1) as i64;
            let value = bits % n;
            // Reject the final partial block where bits - value + (n - 1) wraps negative.
            if (bits - value).wrapping_add(n).wrapping_sub(1) >= 0 {
                return value;
            }
        }
    }

    /// Generate the next 32-bit value (low half of `next_long`)
    pub fn next_int(&mut self) -> i32 {
        self.next_long() as i32
    }

    /// Uniform value in `[0, n)`
    pub fn next_int_below(&mut self, n: i32) -> Result<i32, RngError> {
        self.next_long_below(i64::from(n)).map(|v| v as i32)
    }

    /// Low `bits` bits of the next value (`bits` in 1..=32)
    pub fn next_bits(&mut self, bits: u32) -> i32 {
        let bits = bits.clamp(1, 32);
        (self.next_long() as u64 & ((1u64 << bits) - 1)) as i32
    }

    pub fn next_bool(&mut self) -> bool {
        self.next_long() & 1 != 0
    }

    /// Uniform f64 in `[0.0, 1.0)` from the top 53 bits
    pub fn next_f64(&mut self) -> f64 {
        ((self.next_long() as u64) >> 11) as f64 * NORMALIZER_F64
    }

    /// Uniform f32 in `[0.0, 1.0)` from the top 24 bits
    pub fn next_f32(&mut self) -> f32 {
        (((self.next_long() as u64) >> 40) as f64 * NORMALIZER_F32) as f32
    }

    /// Fill `buf` from its end, consuming one `next_long` per 8 bytes
    pub fn fill_bytes(&mut self, buf: &mut [u8]) {
        let mut remaining = buf.len();
        while remaining != 0 {
            let n = remaining.min(8);
            let mut bits = self.next_long() as u64;
            for _ in 0..n {
                remaining -= 1;
                buf[remaining] = bits as u8;
                bits >>= 8;
            }
        }
    }

    /// Uniform value in `[min, max)`
    ///
    /// # Example
    /// ```
    /// use cuckoo_collections::XorShift128Plus;
    ///
    /// let mut rng = XorShift128Plus::new(12345);
    /// let roll = rng.range(1, 7).unwrap();
    /// assert!((1..7).contains(&roll));
    /// ```
    pub fn range(&mut self, min: i64, max: i64) -> Result<i64, RngError> {
        if min >= max {
            return Err(RngError::InvalidRange { min, max });
        }
        match max.checked_sub(min) {
            Some(span) => Ok(min + self.bounded(span)),
            // Span wider than i64::MAX: sample the full width and reject.
            None => loop {
                let candidate = self.next_long();
                if candidate >= min && candidate < max {
                    return Ok(candidate);
                }
            },
        }
    }
}

impl Default for XorShift128Plus {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for XorShift128Plus {
    fn next_index(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        self.bounded(bound.min(i64::MAX as usize) as i64) as usize
    }
}

/// murmur3 64-bit finaliser
fn murmur_finalize(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}
