//! Per-thread shared engine
//!
//! Containers that are not handed an explicit generator draw from one
//! engine per thread. It starts from entropy; call [`reseed_shared`] to make
//! a thread's sequence reproducible.

use std::cell::RefCell;

use super::{RandomSource, XorShift128Plus};

thread_local! {
    static SHARED: RefCell<XorShift128Plus> = RefCell::new(XorShift128Plus::from_entropy());
}

/// Run `f` with exclusive access to this thread's shared engine
pub fn with_shared<F, T>(f: F) -> T
where
    F: FnOnce(&mut XorShift128Plus) -> T,
{
    SHARED.with(|rng| f(&mut rng.borrow_mut()))
}

/// Re-seed this thread's shared engine
///
/// # Example
/// ```
/// use cuckoo_collections::{reseed_shared, DynamicArray};
///
/// let mut a = DynamicArray::from(vec![1, 2, 3, 4, 5]);
/// let mut b = a.clone();
///
/// reseed_shared(42);
/// a.shuffle();
/// reseed_shared(42);
/// b.shuffle();
/// assert_eq!(a, b);
/// ```
pub fn reseed_shared(seed: u64) {
    with_shared(|rng| rng.set_seed(seed));
}

/// Zero-sized handle onto this thread's shared engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SharedRandom;

impl RandomSource for SharedRandom {
    fn next_index(&mut self, bound: usize) -> usize {
        with_shared(|rng| rng.next_index(bound))
    }
}
