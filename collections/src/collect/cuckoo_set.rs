//! Cuckoo hash set
//!
//! Open-addressing set where every key has three candidate buckets in a
//! power-of-two primary table, followed by a small overflow **stash**.
//!
//! # Insertion
//!
//! 1. Reject the key if it already sits in one of its buckets or the stash.
//! 2. Place it in the first empty candidate bucket.
//! 3. Otherwise evict a randomly chosen occupant and try to re-home the
//!    evicted key in its own candidates, at most `push_iterations` times.
//! 4. If the chain never finds an empty bucket, the last evicted key goes to
//!    the stash; a full stash doubles the table and retries.
//!
//! The load check compares the size *before* the insertion against the
//! threshold, so a 32-slot table at load factor 0.8 holds 25 keys and doubles
//! on the 26th, whether that key lands in a bucket or in the stash.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use ahash::AHasher;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::collect::array::DynamicArray;
use crate::config::{debug_enabled, validate_set_params, SetConfig, MAX_SET_CAPACITY};
use crate::preconditions::{check_expression, CollectionError};
use crate::rng::{RandomSource, SharedRandom, XorShift128Plus};

/// Fixed-key `ahash` builder: hash codes (and iteration order) are the same
/// on every run.
pub type DefaultHashBuilder = BuildHasherDefault<AHasher>;

const PRIME1: u32 = 0xB4B8_2E39;
const PRIME2: u32 = 0xCED1_C241;

const DEFAULT_CAPACITY: usize = 32;
const DEFAULT_LOAD_FACTOR: f32 = 0.8;

fn empty_table<T>(len: usize) -> Vec<Option<T>> {
    std::iter::repeat_with(|| None).take(len).collect()
}

/// Set of unique keys using cuckoo hashing with a stash
///
/// # Example
/// ```
/// use cuckoo_collections::CuckooHashSet;
///
/// let mut set = CuckooHashSet::new();
/// assert!(set.add("alpha"));
/// assert!(!set.add("alpha")); // duplicate rejected
/// assert!(set.contains("alpha"));
///
/// assert!(set.remove("alpha"));
/// assert!(set.is_empty());
/// ```
#[derive(Clone)]
pub struct CuckooHashSet<T, S = DefaultHashBuilder, R = SharedRandom> {
    /// Primary buckets `[0, capacity)` followed by the stash
    table: Vec<Option<T>>,

    size: usize,
    capacity: usize,
    stash_size: usize,
    stash_capacity: usize,
    load_factor: f32,
    hash_shift: u32,
    mask: u32,
    threshold: usize,
    push_iterations: usize,

    hasher: S,
    rng: R,
}

impl<T> CuckooHashSet<T> {
    /// Empty set with capacity 32 and load factor 0.8 (holds 25 keys before growing)
    pub fn new() -> Self {
        Self::build(
            DEFAULT_CAPACITY,
            DEFAULT_LOAD_FACTOR,
            DefaultHashBuilder::default(),
            SharedRandom,
        )
    }

    /// Empty set with load factor 0.8
    pub fn with_capacity(initial_capacity: usize) -> Result<Self, CollectionError> {
        Self::with_capacity_and_load_factor(initial_capacity, DEFAULT_LOAD_FACTOR)
    }

    pub fn with_capacity_and_load_factor(
        initial_capacity: usize,
        load_factor: f32,
    ) -> Result<Self, CollectionError> {
        Self::with_hasher_and_random(
            initial_capacity,
            load_factor,
            DefaultHashBuilder::default(),
            SharedRandom,
        )
    }
}

impl<T> CuckooHashSet<T, DefaultHashBuilder, XorShift128Plus> {
    /// Set with its own eviction engine, seeded from `config.seed` (or entropy)
    pub fn with_config(config: &SetConfig) -> Result<Self, CollectionError> {
        let rng = match config.seed {
            Some(seed) => XorShift128Plus::new(seed),
            None => XorShift128Plus::from_entropy(),
        };
        Self::with_hasher_and_random(
            config.initial_capacity,
            config.load_factor,
            DefaultHashBuilder::default(),
            rng,
        )
    }
}

impl<T, S, R> CuckooHashSet<T, S, R> {
    /// Fully specified constructor
    ///
    /// # Errors
    /// [`CollectionError::InvalidArgument`] if `initial_capacity > 2^30` or
    /// `load_factor` is not a positive finite number.
    pub fn with_hasher_and_random(
        initial_capacity: usize,
        load_factor: f32,
        hasher: S,
        rng: R,
    ) -> Result<Self, CollectionError> {
        validate_set_params(initial_capacity, load_factor)?;
        Ok(Self::build(initial_capacity, load_factor, hasher, rng))
    }

    fn build(initial_capacity: usize, load_factor: f32, hasher: S, rng: R) -> Self {
        let mut set = Self {
            table: Vec::new(),
            size: 0,
            capacity: 0,
            stash_size: 0,
            stash_capacity: 0,
            load_factor,
            hash_shift: 0,
            mask: 0,
            threshold: 0,
            push_iterations: 0,
            hasher,
            rng,
        };
        set.set_geometry(initial_capacity.max(1).next_power_of_two());
        set.table = empty_table(set.capacity + set.stash_capacity);
        set
    }

    /// Recompute every field derived from the primary capacity
    fn set_geometry(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.threshold = (capacity as f64 * f64::from(self.load_factor)) as usize;
        self.mask = (capacity - 1) as u32;
        self.hash_shift = 31 - capacity.trailing_zeros();
        self.stash_capacity = 3usize.max((capacity as f64).ln().ceil() as usize * 2);
        self.push_iterations = capacity.min(8).max((capacity as f64).sqrt() as usize / 8);
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Primary table size (always a power of two)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys currently held in the stash
    pub fn stash_len(&self) -> usize {
        self.stash_size
    }

    pub fn stash_capacity(&self) -> usize {
        self.stash_capacity
    }

    /// Size at which the next insertion doubles the table
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Maximum evictions before a key is sent to the stash
    pub fn push_iterations(&self) -> usize {
        self.push_iterations
    }

    /// Remove every key; table size is kept
    pub fn clear(&mut self) {
        if self.size == 0 {
            return;
        }
        let end = self.capacity + self.stash_size;
        self.table[..end].iter_mut().for_each(|slot| *slot = None);
        self.size = 0;
        self.stash_size = 0;
    }

    /// Remove every key and cut the table down to `max_capacity` (rounded up
    /// to a power of two) if it is larger
    pub fn clear_to(&mut self, max_capacity: usize) {
        if self.capacity <= max_capacity {
            self.clear();
            return;
        }
        self.set_geometry(max_capacity.max(1).next_power_of_two());
        self.table = empty_table(self.capacity + self.stash_capacity);
        self.size = 0;
        self.stash_size = 0;
    }

    pub fn iter(&self) -> SetIter<'_, T> {
        SetIter {
            slots: self.table[..self.capacity + self.stash_size].iter(),
            remaining: self.size,
        }
    }

    /// Cursor that can remove the key it just yielded
    pub fn cursor(&mut self) -> SetCursor<'_, T, S, R> {
        let mut cursor = SetCursor {
            set: self,
            next_index: 0,
            current: None,
        };
        cursor.reset();
        cursor
    }

    /// Any key (the first found scanning the table)
    pub fn first(&self) -> Result<&T, CollectionError> {
        self.iter()
            .next()
            .ok_or_else(|| CollectionError::IllegalState("set is empty".to_string()))
    }

    /// Move every key into an ordered [`DynamicArray`]
    pub fn into_array(self) -> DynamicArray<T> {
        let mut array = DynamicArray::with_capacity(true, self.size);
        array.extend(self.table.into_iter().flatten());
        array
    }

    /// Take the stash entry at `index`, filling its slot with the last stash entry
    fn remove_stash_index(&mut self, index: usize) -> Option<T> {
        self.stash_size -= 1;
        let last = self.capacity + self.stash_size;
        let removed = self.table[index].take();
        if index < last {
            self.table[index] = self.table[last].take();
        }
        removed
    }
}

impl<T, S, R> CuckooHashSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher,
    R: RandomSource,
{
    fn hash_code<Q: Hash + ?Sized>(&self, key: &Q) -> u32 {
        self.hasher.hash_one(key) as u32
    }

    fn hash2(&self, h: u32) -> usize {
        let h = h.wrapping_mul(PRIME1);
        ((h ^ (h >> self.hash_shift)) & self.mask) as usize
    }

    fn hash3(&self, h: u32) -> usize {
        let h = h.wrapping_mul(PRIME2);
        ((h ^ (h >> self.hash_shift)) & self.mask) as usize
    }

    /// The three candidate buckets of hash code `h`
    fn buckets(&self, h: u32) -> [usize; 3] {
        [(h & self.mask) as usize, self.hash2(h), self.hash3(h)]
    }

    fn stash(&self) -> &[Option<T>] {
        &self.table[self.capacity..self.capacity + self.stash_size]
    }

    /// Add `key`; returns `false` if an equal key was already present
    pub fn add(&mut self, key: T) -> bool {
        let buckets = self.buckets(self.hash_code(&key));

        if buckets.iter().any(|&i| self.table[i].as_ref() == Some(&key)) {
            return false;
        }
        if self.stash().iter().any(|slot| slot.as_ref() == Some(&key)) {
            return false;
        }

        self.insert_new(key, buckets);
        true
    }

    /// Insertion without the duplicate scan (rehash path)
    fn insert_unchecked(&mut self, key: T) {
        let buckets = self.buckets(self.hash_code(&key));
        self.insert_new(key, buckets);
    }

    fn insert_new(&mut self, key: T, buckets: [usize; 3]) {
        match buckets.iter().find(|&&i| self.table[i].is_none()) {
            Some(&empty) => self.place(empty, key),
            None => self.push(key, buckets),
        }
    }

    /// Store `key` in an empty primary bucket
    fn place(&mut self, index: usize, key: T) {
        self.table[index] = Some(key);
        self.record_insert();
    }

    /// Count a new key, doubling when the size before it had already
    /// reached the threshold
    fn record_insert(&mut self) {
        let before = self.size;
        self.size += 1;
        if before >= self.threshold {
            self.resize(self.capacity << 1);
        }
    }

    /// Bounded cuckoo eviction chain
    fn push(&mut self, mut insert_key: T, mut buckets: [usize; 3]) {
        let mut iterations = 0;
        loop {
            let slot = buckets[self.rng.next_index(3)];
            let Some(evicted) = self.table[slot].replace(insert_key) else {
                // Bucket was free after all: nothing evicted.
                self.record_insert();
                return;
            };

            buckets = self.buckets(self.hash_code(&evicted));
            if let Some(&empty) = buckets.iter().find(|&&i| self.table[i].is_none()) {
                self.place(empty, evicted);
                return;
            }

            iterations += 1;
            if iterations == self.push_iterations {
                if debug_enabled() {
                    eprintln!(
                        "[CUCKOO DEBUG] eviction chain exhausted after {} pushes (size={}, cap={})",
                        iterations, self.size, self.capacity
                    );
                }
                self.add_stash(evicted);
                return;
            }
            insert_key = evicted;
        }
    }

    fn add_stash(&mut self, key: T) {
        if self.stash_size == self.stash_capacity {
            if debug_enabled() {
                eprintln!(
                    "[CUCKOO DEBUG] stash full ({} entries), doubling capacity {}",
                    self.stash_capacity, self.capacity
                );
            }
            self.resize(self.capacity << 1);
            self.add(key);
            return;
        }
        let index = self.capacity + self.stash_size;
        self.table[index] = Some(key);
        self.stash_size += 1;
        self.record_insert();
    }

    /// Full rehash into a table of `new_capacity` primary buckets
    fn resize(&mut self, new_capacity: usize) {
        if debug_enabled() {
            eprintln!(
                "[CUCKOO DEBUG] resize: capacity {} -> {} (size={}, stash={})",
                self.capacity, new_capacity, self.size, self.stash_size
            );
        }

        let old_end = self.capacity + self.stash_size;
        self.set_geometry(new_capacity);
        let mut old_table = std::mem::replace(
            &mut self.table,
            empty_table(self.capacity + self.stash_capacity),
        );
        old_table.truncate(old_end);

        let old_size = self.size;
        self.size = 0;
        self.stash_size = 0;
        if old_size > 0 {
            for key in old_table.into_iter().flatten() {
                self.insert_unchecked(key);
            }
        }
    }

    /// Whether a key equal to `key` is present
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let buckets = self.buckets(self.hash_code(key));
        buckets.iter().any(|&i| slot_holds(&self.table[i], key))
            || self.stash().iter().any(|slot| slot_holds(slot, key))
    }

    /// Remove `key`; returns whether it was present
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let buckets = self.buckets(self.hash_code(key));
        for index in buckets {
            if slot_holds(&self.table[index], key) {
                self.table[index] = None;
                self.size -= 1;
                return true;
            }
        }

        let stash_start = self.capacity;
        let position = self
            .stash()
            .iter()
            .position(|slot| slot_holds(slot, key));
        match position {
            Some(offset) => {
                self.remove_stash_index(stash_start + offset);
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Grow so `additional` more keys fit without crossing the threshold
    ///
    /// # Errors
    /// [`CollectionError::InvalidArgument`] if that would need more than
    /// 2^30 primary buckets; the set is left unchanged.
    pub fn ensure_capacity(&mut self, additional: usize) -> Result<(), CollectionError> {
        let wanted = self.wanted_capacity(additional);
        check_expression(
            wanted <= MAX_SET_CAPACITY,
            format!("capacity for {} more keys is too large: {}", additional, wanted),
        )?;
        self.grow_to(wanted);
        Ok(())
    }

    /// Pre-size for a bulk insert. Requests beyond the capacity limit are
    /// skipped and the keys grow the table one doubling at a time.
    fn presize(&mut self, additional: usize) {
        let wanted = self.wanted_capacity(additional);
        if wanted <= MAX_SET_CAPACITY {
            self.grow_to(wanted);
        }
    }

    /// Primary buckets needed to hold `additional` more keys (0 if they fit)
    fn wanted_capacity(&self, additional: usize) -> usize {
        let required = self.size.saturating_add(additional);
        if required < self.threshold {
            return 0;
        }
        (required as f64 / f64::from(self.load_factor)) as usize
    }

    fn grow_to(&mut self, wanted: usize) {
        let target = wanted.max(1).next_power_of_two();
        if target > self.capacity {
            self.resize(target);
        }
    }

    /// Reduce the table to `max_capacity` (never below the key count),
    /// rounded up to a power of two. No-op if already that small.
    pub fn shrink(&mut self, max_capacity: usize) {
        let max_capacity = max_capacity.max(self.size);
        if self.capacity <= max_capacity {
            return;
        }
        self.resize(max_capacity.max(1).next_power_of_two());
    }

    /// Add every key of `keys`
    pub fn add_all(&mut self, keys: &[T])
    where
        T: Clone,
    {
        self.presize(keys.len());
        for key in keys {
            self.add(key.clone());
        }
    }

    /// Add `length` keys of `array` starting at `offset`
    pub fn add_all_array(
        &mut self,
        array: &DynamicArray<T>,
        offset: usize,
        length: usize,
    ) -> Result<(), CollectionError>
    where
        T: Clone,
    {
        check_expression(
            offset.saturating_add(length) <= array.len(),
            format!(
                "offset + length must be <= size: {} + {} <= {}",
                offset,
                length,
                array.len()
            ),
        )?;
        self.add_all(&array.as_slice()[offset..offset + length]);
        Ok(())
    }

    /// Add every key of another set
    pub fn add_all_set<S2, R2>(&mut self, other: &CuckooHashSet<T, S2, R2>)
    where
        T: Clone,
    {
        self.presize(other.len());
        for key in other.iter() {
            self.add(key.clone());
        }
    }
}

fn slot_holds<T, Q>(slot: &Option<T>, key: &Q) -> bool
where
    T: Borrow<Q>,
    Q: Eq + ?Sized,
{
    matches!(slot, Some(held) if held.borrow() == key)
}

impl<T: Clone, S, R> CuckooHashSet<T, S, R> {
    /// Copy every key into a new ordered [`DynamicArray`]
    pub fn to_array(&self) -> DynamicArray<T> {
        let mut array = DynamicArray::with_capacity(true, self.size);
        array.extend(self.iter().cloned());
        array
    }
}

impl<T: fmt::Display, S, R> CuckooHashSet<T, S, R> {
    /// Keys rendered with `separator` between them
    pub fn join(&self, separator: &str) -> String {
        let mut out = String::with_capacity(32);
        for (i, key) in self.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            out.push_str(&key.to_string());
        }
        out
    }
}

impl<T, S: Default, R: Default> Default for CuckooHashSet<T, S, R> {
    fn default() -> Self {
        Self::build(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, S::default(), R::default())
    }
}

impl<T: fmt::Debug, S, R> fmt::Debug for CuckooHashSet<T, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, S, R> fmt::Display for CuckooHashSet<T, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.join(", "))
    }
}

impl<T, S, R> Extend<T> for CuckooHashSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher,
    R: RandomSource,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.presize(iter.size_hint().0);
        for key in iter {
            self.add(key);
        }
    }
}

impl<T, S, R> FromIterator<T> for CuckooHashSet<T, S, R>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
    R: RandomSource + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<'a, T, S, R> IntoIterator for &'a CuckooHashSet<T, S, R> {
    type Item = &'a T;
    type IntoIter = SetIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S, R> IntoIterator for CuckooHashSet<T, S, R> {
    type Item = T;
    type IntoIter = std::iter::Flatten<std::vec::IntoIter<Option<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter().flatten()
    }
}

impl<T: Serialize, S, R> Serialize for CuckooHashSet<T, S, R> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, T, S, R> Deserialize<'de> for CuckooHashSet<T, S, R>
where
    T: Deserialize<'de> + Hash + Eq,
    S: BuildHasher + Default,
    R: RandomSource + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(|keys| keys.into_iter().collect())
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// Iterator over the keys of a [`CuckooHashSet`]: primary table, then stash
pub struct SetIter<'a, T> {
    slots: std::slice::Iter<'a, Option<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for SetIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let key = self.slots.find_map(Option::as_ref)?;
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for SetIter<'_, T> {}

/// Forward cursor over a [`CuckooHashSet`] that can remove what it yielded
///
/// # Example
/// ```
/// use cuckoo_collections::CuckooHashSet;
///
/// let mut set: CuckooHashSet<u32> = (0..10).collect();
/// let mut cursor = set.cursor();
/// while let Some(&key) = cursor.advance() {
///     if key % 2 == 1 {
///         cursor.remove().unwrap();
///     }
/// }
/// assert_eq!(set.len(), 5);
/// assert!(!set.contains(&3));
/// ```
pub struct SetCursor<'a, T, S, R> {
    set: &'a mut CuckooHashSet<T, S, R>,
    next_index: usize,
    current: Option<usize>,
}

impl<'a, T, S, R> SetCursor<'a, T, S, R> {
    fn end(&self) -> usize {
        self.set.capacity + self.set.stash_size
    }

    /// First occupied slot at or after `from`, or `end()`
    fn find_from(&self, from: usize) -> usize {
        let end = self.end();
        (from..end)
            .find(|&i| self.set.table[i].is_some())
            .unwrap_or(end)
    }

    pub fn has_next(&self) -> bool {
        self.next_index < self.end()
    }

    /// Yield the next key, or `None` at the end
    pub fn advance(&mut self) -> Option<&T> {
        if self.next_index >= self.end() {
            self.current = None;
            return None;
        }
        let index = self.next_index;
        self.current = Some(index);
        self.next_index = self.find_from(index + 1);
        self.set.table[index].as_ref()
    }

    /// Remove the key returned by the last `advance`
    ///
    /// Removing from the stash moves the last stash entry into the freed
    /// slot; the cursor rescans from there so that entry is not skipped.
    pub fn remove(&mut self) -> Result<T, CollectionError> {
        let Some(index) = self.current.take() else {
            return Err(CollectionError::IllegalState(
                "advance() must be called before remove()".to_string(),
            ));
        };

        let removed = if index >= self.set.capacity {
            let removed = self.set.remove_stash_index(index);
            self.next_index = self.find_from(index);
            removed
        } else {
            self.set.table[index].take()
        };

        let key = removed.ok_or_else(|| {
            CollectionError::IllegalState(format!("slot {} was already empty", index))
        })?;
        self.set.size -= 1;
        Ok(key)
    }

    /// Restart from the first slot
    pub fn reset(&mut self) {
        self.current = None;
        self.next_index = self.find_from(0);
    }

    /// Append every key not yet yielded to `array`
    pub fn remaining_into(&mut self, array: &mut DynamicArray<T>)
    where
        T: Clone,
    {
        while let Some(key) = self.advance() {
            array.add(key.clone());
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::Hasher;

    /// Sends every key to the same hash code, forcing eviction chains and stash use
    #[derive(Default, Clone)]
    struct ConstantHasher;

    impl Hasher for ConstantHasher {
        fn finish(&self) -> u64 {
            0
        }
        fn write(&mut self, _bytes: &[u8]) {}
    }

    type Colliding = BuildHasherDefault<ConstantHasher>;

    /// Replays a fixed list of choices
    #[derive(Default, Clone)]
    struct Scripted {
        choices: Vec<usize>,
        at: usize,
    }

    impl RandomSource for Scripted {
        fn next_index(&mut self, bound: usize) -> usize {
            let choice = self.choices.get(self.at).copied().unwrap_or(0) % bound;
            self.at += 1;
            choice
        }
    }

    fn colliding_set(capacity: usize, load_factor: f32) -> CuckooHashSet<u32, Colliding, Scripted> {
        let hasher = Colliding::default();
        CuckooHashSet::with_hasher_and_random(capacity, load_factor, hasher, Scripted::default())
            .unwrap()
    }

    #[test]
    fn test_geometry_for_default_capacity() {
        let set: CuckooHashSet<u32> = CuckooHashSet::new();
        assert_eq!(set.capacity, 32);
        assert_eq!(set.mask, 31);
        assert_eq!(set.hash_shift, 26);
        assert_eq!(set.threshold, 25);
        assert_eq!(set.stash_capacity, 8);
        assert_eq!(set.push_iterations, 8);
        assert_eq!(set.table.len(), 40);
    }

    #[test]
    fn test_geometry_small_and_large() {
        let tiny: CuckooHashSet<u32> = CuckooHashSet::with_capacity(0).unwrap();
        assert_eq!(tiny.capacity, 1);
        assert_eq!(tiny.mask, 0);
        assert_eq!(tiny.stash_capacity, 3);
        assert_eq!(tiny.push_iterations, 1);

        let big: CuckooHashSet<u32> = CuckooHashSet::with_capacity(1 << 14).unwrap();
        // ln(16384) = 9.7 → 10 * 2
        assert_eq!(big.stash_capacity, 20);
        // sqrt(16384) / 8 = 16
        assert_eq!(big.push_iterations, 16);
    }

    #[test]
    fn test_colliding_keys_fill_candidates_then_stash() {
        // All keys share buckets {0, hash2(0), hash3(0)} = {0}, so only one
        // primary slot is usable and the rest go to the stash.
        let mut set = colliding_set(64, 0.8);
        for key in 0..4 {
            assert!(set.add(key));
        }
        assert_eq!(set.len(), 4);
        assert_eq!(set.stash_size, 3);
        for key in 0..4 {
            assert!(set.contains(&key), "key {} lost", key);
        }
    }

    #[test]
    fn test_full_stash_doubles_capacity() {
        // Load factor high enough that only the stash limit can trigger growth.
        let mut set = colliding_set(2, 10.0);
        let stash_capacity = set.stash_capacity;
        assert_eq!(stash_capacity, 3);

        for key in 0..(stash_capacity as u32 + 1) {
            set.add(key);
        }
        assert_eq!(set.capacity, 2);
        assert_eq!(set.stash_size, 3);

        set.add(stash_capacity as u32 + 1);
        assert_eq!(set.capacity, 4);
        assert_eq!(set.len(), stash_capacity + 2);
        for key in 0..(stash_capacity as u32 + 2) {
            assert!(set.contains(&key));
        }
    }

    #[test]
    fn test_stashed_key_past_threshold_doubles_capacity() {
        // capacity 4, threshold 3: key 0 takes the only bucket, keys 1..=3 are stashed
        let mut set = colliding_set(4, 0.8);
        assert_eq!(set.threshold, 3);
        for key in 0..3 {
            set.add(key);
        }
        assert_eq!(set.capacity, 4);
        assert_eq!(set.stash_size, 2);

        set.add(3);
        assert_eq!(set.capacity, 8, "size before the stashed insert was 3");
        assert_eq!(set.len(), 4);
        for key in 0..4 {
            assert!(set.contains(&key));
        }
    }

    #[test]
    fn test_ensure_capacity_rejects_oversized_request() {
        let mut set: CuckooHashSet<u8> = CuckooHashSet::new();
        let result = set.ensure_capacity(1usize << 34);
        assert!(matches!(result, Err(CollectionError::InvalidArgument(_))));
        assert_eq!(set.capacity, 32, "set unchanged after rejection");
        assert_eq!(set.hash_shift, 26);

        assert!(set.ensure_capacity(usize::MAX).is_err());
        assert!(set.ensure_capacity(MAX_SET_CAPACITY).is_err());
    }

    #[test]
    fn test_remove_from_stash_compacts() {
        let mut set = colliding_set(64, 0.8);
        for key in 0..4 {
            set.add(key);
        }
        let stashed: Vec<u32> = set.stash().iter().flatten().copied().collect();
        assert!(set.remove(&stashed[0]));
        assert_eq!(set.stash_size, 2);
        assert!(set.table[set.capacity + 2].is_none(), "vacated stash slot cleared");
        for key in &stashed[1..] {
            assert!(set.contains(key));
        }
    }

    #[test]
    fn test_cursor_remove_in_stash_does_not_skip() {
        let mut set = colliding_set(64, 0.8);
        for key in 0..4 {
            set.add(key);
        }

        let mut seen = Vec::new();
        let mut cursor = set.cursor();
        while let Some(&key) = cursor.advance() {
            seen.push(key);
            cursor.remove().unwrap();
        }
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert!(set.is_empty());
        assert_eq!(set.stash_size, 0);
    }

    #[test]
    fn test_clear_to_rounds_to_power_of_two() {
        let mut set: CuckooHashSet<u32> = CuckooHashSet::with_capacity(256).unwrap();
        set.extend(0..10);
        set.clear_to(20);
        assert_eq!(set.capacity, 32);
        assert_eq!(set.mask, 31);
        assert!(set.is_empty());
        assert!(!set.contains(&3));
    }
}
