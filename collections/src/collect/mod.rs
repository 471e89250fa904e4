//! Containers
//!
//! - [`array::DynamicArray`]: growable sequence, ordered or unordered
//! - [`cuckoo_set::CuckooHashSet`]: open-addressing set with cuckoo eviction and a stash

pub mod array;
pub mod cuckoo_set;

pub use array::{ArrayCursor, DynamicArray, SameInstance, Select};
pub use cuckoo_set::{CuckooHashSet, DefaultHashBuilder, SetCursor, SetIter};
