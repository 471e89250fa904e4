//! Dynamic array
//!
//! A growable, index-addressable sequence that is either **ordered** or
//! **unordered**, fixed at construction:
//!
//! - Ordered: removals and insertions shift the tail, so positions are stable
//!   relative to each other.
//! - Unordered: removal moves the last element into the gap (O(1)), and
//!   insertion moves the displaced element to the end. Positions are not
//!   stable, so `get` is only meaningful for ordered arrays.
//!
//! # Growth
//!
//! When full, `add` grows the backing capacity to `max(8, floor(size * 1.75))`.
//! Capacity never changes implicitly otherwise; `shrink` trims it to `size`.

use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::collect::cuckoo_set::DefaultHashBuilder;
use crate::config::ArrayConfig;
use crate::preconditions::{check_element_index, check_position_index, check_state, CollectionError};
use crate::rng::{RandomSource, SharedRandom};

const MIN_GROWTH: usize = 8;

/// Capacity after growing a full array holding `size` elements
fn grown_capacity(size: usize) -> usize {
    MIN_GROWTH.max(size.saturating_mul(7) / 4)
}

fn empty_error(operation: &str) -> CollectionError {
    CollectionError::IllegalState(format!("No elements to {}", operation))
}

/// Growable sequence with explicit capacity management
///
/// # Example
/// ```
/// use cuckoo_collections::DynamicArray;
///
/// let mut array = DynamicArray::with_capacity(true, 2);
/// array.add("a");
/// array.add("b");
/// array.add("c"); // full: grows to max(8, floor(2 * 1.75))
///
/// assert_eq!(array.capacity(), 8);
/// assert_eq!(array.get(2).unwrap(), &"c");
/// assert_eq!(array.to_string(), "[a, b, c]");
/// ```
#[derive(Debug)]
pub struct DynamicArray<T> {
    /// Live elements; `items.len()` is the logical size
    items: Vec<T>,

    /// Logical backing capacity (always >= `items.len()`)
    capacity: usize,

    ordered: bool,
}

impl<T> DynamicArray<T> {
    /// Create an empty ordered array with capacity 16
    pub fn new() -> Self {
        Self::with_config(&ArrayConfig::default())
    }

    /// Create an empty ordered or unordered array
    pub fn with_capacity(ordered: bool, capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            ordered,
        }
    }

    pub fn with_config(config: &ArrayConfig) -> Self {
        Self::with_capacity(config.ordered, config.capacity)
    }

    /// Wrap an existing vector, with capacity sized exactly to it
    pub fn from_vec(ordered: bool, items: Vec<T>) -> Self {
        let capacity = items.len();
        let mut array = Self {
            items,
            capacity,
            ordered,
        };
        array.items.shrink_to(capacity);
        array
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Backing capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Append a value, growing by 1.75x (minimum 8) when full
    pub fn add(&mut self, value: T) {
        if self.items.len() == self.capacity {
            self.resize(grown_capacity(self.items.len()));
        }
        self.items.push(value);
    }

    /// Element at `index`
    ///
    /// Only meaningful for ordered arrays; unordered positions move on removal.
    pub fn get(&self, index: usize) -> Result<&T, CollectionError> {
        check_element_index(index, self.items.len(), "index")?;
        Ok(&self.items[index])
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, CollectionError> {
        check_element_index(index, self.items.len(), "index")?;
        Ok(&mut self.items[index])
    }

    /// Replace the element at `index`, returning the previous value
    pub fn set(&mut self, index: usize, value: T) -> Result<T, CollectionError> {
        check_element_index(index, self.items.len(), "index")?;
        Ok(std::mem::replace(&mut self.items[index], value))
    }

    /// Insert `value` at `index` (`index == len` appends)
    ///
    /// Ordered arrays shift `[index, len)` right by one. Unordered arrays move
    /// the element at `index` to the end instead of shifting.
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), CollectionError> {
        check_position_index(index, self.items.len(), "insert index")?;

        if self.items.len() == self.capacity {
            self.resize(grown_capacity(self.items.len()));
        }

        if self.ordered || index == self.items.len() {
            self.items.insert(index, value);
        } else {
            let displaced = std::mem::replace(&mut self.items[index], value);
            self.items.push(displaced);
        }
        Ok(())
    }

    pub fn swap(&mut self, first: usize, second: usize) -> Result<(), CollectionError> {
        check_element_index(first, self.items.len(), "first")?;
        check_element_index(second, self.items.len(), "second")?;
        self.items.swap(first, second);
        Ok(())
    }

    /// Remove and return the element at `index`
    ///
    /// Ordered arrays shift the tail left; unordered arrays move the last
    /// element into the freed slot.
    pub fn remove_index(&mut self, index: usize) -> Result<T, CollectionError> {
        check_element_index(index, self.items.len(), "index")?;
        if self.ordered {
            Ok(self.items.remove(index))
        } else {
            Ok(self.items.swap_remove(index))
        }
    }

    /// Remove the inclusive range `[start, end]`
    ///
    /// Unordered arrays fill the vacated range from the tail, so exactly the
    /// elements outside the range survive.
    pub fn remove_range(&mut self, start: usize, end: usize) -> Result<(), CollectionError> {
        check_element_index(end, self.items.len(), "end")?;
        check_element_index(start, end + 1, "start")?;

        if self.ordered {
            self.items.drain(start..=end);
        } else {
            // Descending order: swap_remove(i) only touches slot i and the last
            // slot, so every slot below i still holds its original element.
            for index in (start..=end).rev() {
                self.items.swap_remove(index);
            }
        }
        Ok(())
    }

    /// Remove and return the last element
    pub fn pop(&mut self) -> Result<T, CollectionError> {
        self.items.pop().ok_or_else(|| empty_error("pop"))
    }

    /// Last element, without removing it
    pub fn peek(&self) -> Result<&T, CollectionError> {
        self.items.last().ok_or_else(|| empty_error("peek"))
    }

    /// Element at index 0
    pub fn first(&self) -> Result<&T, CollectionError> {
        self.items.first().ok_or_else(|| empty_error("get"))
    }

    /// Remove all elements; capacity is kept
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Trim backing capacity to exactly `len`
    pub fn shrink(&mut self) -> &mut Self {
        if self.capacity != self.items.len() {
            self.resize(self.items.len());
        }
        self
    }

    /// Make room for `additional` more elements, growing to
    /// `max(8, len + additional)` if needed
    pub fn ensure_capacity(&mut self, additional: usize) -> &mut Self {
        let required = self.items.len().saturating_add(additional);
        if required > self.capacity {
            self.resize(MIN_GROWTH.max(required));
        }
        self
    }

    /// Drop elements beyond `new_len`; no-op if already that short
    pub fn truncate(&mut self, new_len: usize) {
        if self.items.len() > new_len {
            self.items.truncate(new_len);
        }
    }

    pub fn reverse(&mut self) -> &mut Self {
        self.items.reverse();
        self
    }

    /// Fisher–Yates shuffle using this thread's shared engine
    pub fn shuffle(&mut self) -> &mut Self {
        self.shuffle_with(&mut SharedRandom)
    }

    /// Fisher–Yates shuffle using `rng`
    pub fn shuffle_with<R: RandomSource>(&mut self, rng: &mut R) -> &mut Self {
        for i in (1..self.items.len()).rev() {
            let j = rng.next_index(i + 1);
            self.items.swap(i, j);
        }
        self
    }

    /// Uniformly chosen element, using this thread's shared engine
    pub fn random(&self) -> Result<&T, CollectionError> {
        self.random_with(&mut SharedRandom)
    }

    pub fn random_with<R: RandomSource>(&self, rng: &mut R) -> Result<&T, CollectionError> {
        check_state(!self.items.is_empty(), "No elements to select from")?;
        Ok(&self.items[rng.next_index(self.items.len())])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Cursor that can remove the element it just yielded
    pub fn cursor(&mut self) -> ArrayCursor<'_, T> {
        ArrayCursor {
            array: self,
            index: 0,
            can_remove: false,
        }
    }

    /// Lazy view of the elements matching `predicate`
    ///
    /// # Example
    /// ```
    /// use cuckoo_collections::DynamicArray;
    ///
    /// let array: DynamicArray<i32> = (1..=6).collect();
    /// let even = array.select(|v| v % 2 == 0);
    ///
    /// assert_eq!(even.iter().copied().collect::<Vec<_>>(), vec![2, 4, 6]);
    /// assert_eq!(even.iter().count(), 3); // restartable
    /// ```
    pub fn select<P>(&self, predicate: P) -> Select<'_, T, P>
    where
        P: Fn(&T) -> bool,
    {
        Select {
            items: &self.items,
            predicate,
        }
    }

    /// Set backing capacity; callers never pass less than `len`
    fn resize(&mut self, new_capacity: usize) {
        let len = self.items.len();
        if new_capacity > self.items.capacity() {
            self.items.reserve_exact(new_capacity - len);
        } else {
            self.items.shrink_to(new_capacity);
        }
        self.capacity = new_capacity;
    }
}

impl<T: PartialEq> DynamicArray<T> {
    /// Whether `value` is present
    ///
    /// With `identity`, only the very value stored in a slot matches (address
    /// comparison); otherwise `==` is used.
    pub fn contains(&self, value: &T, identity: bool) -> bool {
        self.index_of(value, identity).is_some()
    }

    /// First index holding `value`
    ///
    /// # Example
    /// ```
    /// use cuckoo_collections::DynamicArray;
    ///
    /// let array = DynamicArray::from(vec![String::from("x"), String::from("x")]);
    /// let second = array.get(1).unwrap();
    ///
    /// assert_eq!(array.index_of(second, false), Some(0));
    /// assert_eq!(array.index_of(second, true), Some(1));
    /// ```
    pub fn index_of(&self, value: &T, identity: bool) -> Option<usize> {
        self.items.iter().position(|item| is_match(item, value, identity))
    }

    pub fn last_index_of(&self, value: &T, identity: bool) -> Option<usize> {
        self.items.iter().rposition(|item| is_match(item, value, identity))
    }

    /// Remove the first element equal to `value`
    ///
    /// Returns whether an element was removed.
    pub fn remove_value(&mut self, value: &T) -> bool {
        match self.index_of(value, false) {
            Some(index) => self.remove_index(index).is_ok(),
            None => false,
        }
    }

    /// Remove one matching element for every element of `other`
    ///
    /// Returns whether the size changed.
    pub fn remove_all(&mut self, other: &DynamicArray<T>) -> bool {
        let start_len = self.items.len();
        for item in other.iter() {
            if let Some(index) = self.index_of(item, false) {
                if self.ordered {
                    self.items.remove(index);
                } else {
                    self.items.swap_remove(index);
                }
            }
        }
        self.items.len() != start_len
    }
}

fn is_match<T: PartialEq>(item: &T, value: &T, identity: bool) -> bool {
    if identity {
        std::ptr::eq(item, value)
    } else {
        item == value
    }
}

/// Handles that can tell whether they point at the same instance
///
/// Lets arrays of shared handles search and remove by instance rather than
/// by value, even when the handle passed in is a separate clone.
pub trait SameInstance {
    fn same_instance(&self, other: &Self) -> bool;
}

impl<T: ?Sized> SameInstance for Rc<T> {
    fn same_instance(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> SameInstance for Arc<T> {
    fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> SameInstance for &T {
    fn same_instance(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}

impl<T: SameInstance> DynamicArray<T> {
    /// First index holding the same instance as `handle`
    ///
    /// # Example
    /// ```
    /// use std::rc::Rc;
    /// use cuckoo_collections::DynamicArray;
    ///
    /// let shared = Rc::new(String::from("x"));
    /// let mut array = DynamicArray::from(vec![Rc::new(String::from("x")), Rc::clone(&shared)]);
    ///
    /// assert_eq!(array.index_of_instance(&shared), Some(1));
    /// assert!(array.remove_instance(&shared));
    /// assert_eq!(array.len(), 1);
    /// ```
    pub fn index_of_instance(&self, handle: &T) -> Option<usize> {
        self.items.iter().position(|item| item.same_instance(handle))
    }

    pub fn last_index_of_instance(&self, handle: &T) -> Option<usize> {
        self.items.iter().rposition(|item| item.same_instance(handle))
    }

    pub fn contains_instance(&self, handle: &T) -> bool {
        self.index_of_instance(handle).is_some()
    }

    /// Remove the first slot holding the same instance as `handle`
    pub fn remove_instance(&mut self, handle: &T) -> bool {
        match self.index_of_instance(handle) {
            Some(index) => self.remove_index(index).is_ok(),
            None => false,
        }
    }

    /// Remove one slot per handle in `other` that shares its instance
    ///
    /// Returns whether the size changed.
    pub fn remove_all_instances(&mut self, other: &DynamicArray<T>) -> bool {
        let start_len = self.items.len();
        for handle in other.iter() {
            if let Some(index) = self.index_of_instance(handle) {
                if self.ordered {
                    self.items.remove(index);
                } else {
                    self.items.swap_remove(index);
                }
            }
        }
        self.items.len() != start_len
    }
}

impl<T: Clone> DynamicArray<T> {
    /// Copy `src[start..start + count]` into a new array sized to `count`
    pub fn from_slice_range(
        ordered: bool,
        src: &[T],
        start: usize,
        count: usize,
    ) -> Result<Self, CollectionError> {
        check_position_index(start, src.len(), "start")?;
        check_position_index(start.saturating_add(count), src.len(), "start + count")?;

        let mut array = Self::with_capacity(ordered, count);
        array.items.extend_from_slice(&src[start..start + count]);
        Ok(array)
    }

    /// Append every element of `src` with a single capacity check
    pub fn add_all(&mut self, src: &[T]) {
        let required = self.items.len() + src.len();
        if required > self.capacity {
            self.resize(grown_capacity(required));
        }
        self.items.extend_from_slice(src);
    }

    /// Append `count` elements of `src` starting at `start`
    pub fn add_all_range(
        &mut self,
        src: &DynamicArray<T>,
        start: usize,
        count: usize,
    ) -> Result<(), CollectionError> {
        check_position_index(start, src.len(), "start")?;
        check_position_index(start.saturating_add(count), src.len(), "start + count")?;
        self.add_all(&src.items[start..start + count]);
        Ok(())
    }

    /// Defensive copy sized exactly `len`
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<T: Hash> DynamicArray<T> {
    /// Polynomial hash over size and elements (seed 17, multiplier 37)
    pub fn hash_code(&self) -> u32 {
        let builder = DefaultHashBuilder::default();
        let mut result: u32 = 17;
        result = result.wrapping_mul(37).wrapping_add(self.items.len() as u32);
        for item in &self.items {
            result = result
                .wrapping_mul(37)
                .wrapping_add(builder.hash_one(item) as u32);
        }
        result
    }
}

impl<T: fmt::Display> DynamicArray<T> {
    /// Elements rendered with `separator` between them
    pub fn join(&self, separator: &str) -> String {
        let mut out = String::new();
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            out.push_str(&item.to_string());
        }
        out
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies are sized exactly to the source's length
impl<T: Clone> Clone for DynamicArray<T> {
    fn clone(&self) -> Self {
        Self::from_vec(self.ordered, self.items.clone())
    }
}

impl<T> From<Vec<T>> for DynamicArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(true, items)
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if lower > 0 {
            self.ensure_capacity(lower);
        }
        for value in iter {
            self.add(value);
        }
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Same length and pairwise-equal elements in slot order
impl<T: PartialEq> PartialEq for DynamicArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: Hash> Hash for DynamicArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_code());
    }
}

impl<T: fmt::Display> fmt::Display for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.join(", "))
    }
}

impl<T: Serialize> Serialize for DynamicArray<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DynamicArray<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(Self::from)
    }
}

// ============================================================================
// Cursor and filtered view
// ============================================================================

/// Forward cursor over a [`DynamicArray`] that can remove what it yielded
///
/// # Example
/// ```
/// use cuckoo_collections::DynamicArray;
///
/// let mut array: DynamicArray<i32> = (1..=5).collect();
/// let mut cursor = array.cursor();
/// while let Some(&value) = cursor.advance() {
///     if value % 2 == 0 {
///         cursor.remove().unwrap();
///     }
/// }
/// assert_eq!(array.as_slice(), &[1, 3, 5]);
/// ```
pub struct ArrayCursor<'a, T> {
    array: &'a mut DynamicArray<T>,
    index: usize,
    can_remove: bool,
}

impl<'a, T> ArrayCursor<'a, T> {
    pub fn has_next(&self) -> bool {
        self.index < self.array.len()
    }

    /// Yield the next element, or `None` at the end
    pub fn advance(&mut self) -> Option<&T> {
        if self.index >= self.array.len() {
            self.can_remove = false;
            return None;
        }
        let index = self.index;
        self.index += 1;
        self.can_remove = true;
        self.array.items.get(index)
    }

    /// Remove the element returned by the last `advance`
    ///
    /// The cursor steps back so the element that moved into the freed slot
    /// (ordered: the successor; unordered: the former last element) is
    /// yielded next.
    pub fn remove(&mut self) -> Result<T, CollectionError> {
        check_state(self.can_remove, "advance() must be called before remove()")?;
        self.can_remove = false;
        self.index -= 1;
        self.array.remove_index(self.index)
    }

    /// Restart from the first element
    pub fn reset(&mut self) {
        self.index = 0;
        self.can_remove = false;
    }
}

/// Lazy, restartable filtered view over a [`DynamicArray`]
pub struct Select<'a, T, P> {
    items: &'a [T],
    predicate: P,
}

impl<'a, T, P> Select<'a, T, P>
where
    P: Fn(&T) -> bool,
{
    /// Fresh pass over the matching elements
    pub fn iter(&self) -> SelectIter<'_, 'a, T, P> {
        SelectIter {
            inner: self.items.iter(),
            predicate: &self.predicate,
        }
    }
}

impl<'s, 'a, T, P> IntoIterator for &'s Select<'a, T, P>
where
    P: Fn(&T) -> bool,
{
    type Item = &'a T;
    type IntoIter = SelectIter<'s, 'a, T, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One pass over a [`Select`] view
pub struct SelectIter<'s, 'a, T, P> {
    inner: std::slice::Iter<'a, T>,
    predicate: &'s P,
}

impl<'s, 'a, T, P> Iterator for SelectIter<'s, 'a, T, P>
where
    P: Fn(&T) -> bool,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let predicate = self.predicate;
        self.inner.find(|item| predicate(*item))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XorShift128Plus;

    fn unordered(values: &[char]) -> DynamicArray<char> {
        let mut array = DynamicArray::with_capacity(false, values.len());
        array.add_all(values);
        array
    }

    #[test]
    fn test_grown_capacity_rule() {
        assert_eq!(grown_capacity(0), 8);
        assert_eq!(grown_capacity(2), 8);
        assert_eq!(grown_capacity(8), 14);
        assert_eq!(grown_capacity(16), 28);
    }

    #[test]
    fn test_unordered_insert_moves_displaced_to_end() {
        let mut array = unordered(&['A', 'B', 'C']);
        array.insert(0, 'X').unwrap();
        assert_eq!(array.as_slice(), &['X', 'B', 'C', 'A']);
    }

    #[test]
    fn test_unordered_remove_range_keeps_survivors() {
        let mut array = unordered(&['A', 'B', 'C', 'D', 'E', 'F']);
        array.remove_range(1, 2).unwrap();

        let mut survivors = array.to_vec();
        survivors.sort();
        assert_eq!(survivors, vec!['A', 'D', 'E', 'F']);
        assert_eq!(array.as_slice(), &['A', 'E', 'F', 'D']);
    }

    #[test]
    fn test_unordered_remove_range_at_tail() {
        let mut array = unordered(&['A', 'B', 'C', 'D']);
        array.remove_range(2, 3).unwrap();
        assert_eq!(array.as_slice(), &['A', 'B']);
    }

    #[test]
    fn test_remove_range_bounds() {
        let mut array = unordered(&['A', 'B']);
        assert!(array.remove_range(0, 2).is_err());
        assert!(array.remove_range(2, 1).is_err());
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn test_shrink_then_add_grows_from_minimum() {
        let mut array = DynamicArray::with_capacity(true, 32);
        array.add(1);
        array.shrink();
        assert_eq!(array.capacity(), 1);
        array.add(2);
        assert_eq!(array.capacity(), 8);
    }

    #[test]
    fn test_clone_is_sized_to_len() {
        let mut array = DynamicArray::with_capacity(false, 64);
        array.add(1);
        array.add(2);
        let copy = array.clone();
        assert_eq!(copy.capacity(), 2);
        assert!(!copy.is_ordered());
        assert_eq!(copy, array);
    }

    #[test]
    fn test_shuffle_with_seeded_engine_is_reproducible() {
        let mut a: DynamicArray<u32> = (0..20).collect();
        let mut b = a.clone();
        a.shuffle_with(&mut XorShift128Plus::new(5));
        b.shuffle_with(&mut XorShift128Plus::new(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_cursor_remove_requires_advance() {
        let mut array: DynamicArray<i32> = (1..=3).collect();
        let mut cursor = array.cursor();
        assert!(matches!(cursor.remove(), Err(CollectionError::IllegalState(_))));

        cursor.advance();
        assert_eq!(cursor.remove(), Ok(1));
        assert!(cursor.remove().is_err(), "second remove without advance");
    }

    #[test]
    fn test_instance_identity_distinguishes_equal_handles() {
        let first = Rc::new(5);
        let twin = Rc::new(5);
        let mut array = DynamicArray::with_capacity(false, 4);
        array.add(Rc::clone(&first));
        array.add(Rc::clone(&twin));
        array.add(Rc::clone(&first));

        assert_eq!(array.index_of(&twin, false), Some(0), "equal by value");
        assert_eq!(array.index_of_instance(&twin), Some(1));
        assert_eq!(array.last_index_of_instance(&first), Some(2));
        assert!(!array.contains_instance(&Rc::new(5)));

        assert!(array.remove_instance(&twin));
        assert!(!array.contains_instance(&twin));
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn test_remove_all_instances_leaves_equal_strangers() {
        let a = Arc::new("a");
        let b = Arc::new("b");
        let mut array = DynamicArray::from(vec![Arc::clone(&a), Arc::new("a"), Arc::clone(&b)]);
        let other = DynamicArray::from(vec![Arc::clone(&a), Arc::clone(&b), Arc::new("b")]);

        assert!(array.remove_all_instances(&other));
        assert_eq!(array.len(), 1);
        assert!(!array.contains_instance(&a));
        assert_eq!(*array.get(0).unwrap(), Arc::new("a"));

        assert!(!array.remove_all_instances(&other));
    }

    #[test]
    fn test_reference_elements_compare_pointees() {
        let values = [1, 1, 2];
        let array: DynamicArray<&i32> = values.iter().collect();
        assert_eq!(array.index_of_instance(&&values[1]), Some(1));
        assert_eq!(array.index_of(&&values[1], false), Some(0));
    }

    #[test]
    fn test_hash_code_ignores_capacity() {
        let mut small = DynamicArray::with_capacity(true, 1);
        let mut large = DynamicArray::with_capacity(true, 100);
        small.add(7);
        large.add(7);
        assert_eq!(small.hash_code(), large.hash_code());
    }
}
