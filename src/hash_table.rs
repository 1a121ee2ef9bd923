//! The raw separate-chaining hash table.
//!
//! This module provides [`HashTable`], the storage layer underneath
//! [`HashMap`](crate::HashMap). It is hash-driven rather than key-driven:
//! every operation takes a precomputed 64-bit hash plus an equality predicate
//! over stored entries, which lets the keyed wrapper hash each key exactly
//! once and lets tests place entries in specific buckets.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::mem;

/// Number of buckets in a freshly constructed (or reset) table.
pub const DEFAULT_CAPACITY: usize = 16;

/// Fraction of the bucket count that may be occupied before the table grows.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// A single entry in a bucket's collision chain.
///
/// The hash is computed once when the entry is created and never recomputed;
/// growth redistributes entries using this cached value. Each node owns the
/// remainder of its chain.
struct Node<T> {
    hash: u64,
    value: T,
    next: Option<Box<Node<T>>>,
}

fn alloc_buckets<T>(capacity: usize) -> Box<[Option<Box<Node<T>>>]> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, || None);
    buckets.into_boxed_slice()
}

fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    (capacity as f32 * load_factor) as usize
}

/// A separate-chaining hash table storing entries of type `T`.
///
/// Each bucket is the head of a singly linked, singly owned chain. The bucket
/// count is always a power of two so the bucket index can be computed with a
/// mask: `hash & (capacity - 1)`. When the entry count exceeds
/// `floor(capacity * load_factor)` after an insertion, the bucket array
/// doubles and every entry is relinked by its cached hash. Capacity only ever
/// grows; removals never shrink the table.
///
/// The table does not implement `Clone`: it is the sole owner of its entries
/// and is intended to be moved, never duplicated.
///
/// ## Example
///
/// ```rust
/// use chain_hash::hash_table::HashTable;
///
/// let mut table: HashTable<(u64, &str)> = HashTable::new();
/// table.insert(42, (1, "one"), |stored, new| stored.0 == new.0);
///
/// assert_eq!(table.find(42, |&(id, _)| id == 1), Some(&(1, "one")));
/// assert_eq!(table.find(42, |&(id, _)| id == 2), None);
/// ```
pub struct HashTable<T> {
    buckets: Box<[Option<Box<Node<T>>>]>,
    len: usize,
    load_factor: f32,
    threshold: usize,
}

impl<T> HashTable<T> {
    /// Creates an empty table with the default capacity of 16 buckets and a
    /// load factor of 0.75, giving an initial growth threshold of 12.
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let table: HashTable<u64> = HashTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// assert_eq!(table.threshold(), 12);
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty table with at least `capacity` buckets.
    ///
    /// The bucket count must be a power of two for the masking index scheme
    /// to behave as modulo, so the request is rounded up to the next power of
    /// two, with a floor of the default capacity.
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let table: HashTable<u64> = HashTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 128);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.next_power_of_two().max(DEFAULT_CAPACITY);
        HashTable {
            buckets: alloc_buckets(capacity),
            len: 0,
            load_factor: DEFAULT_LOAD_FACTOR,
            threshold: threshold_for(capacity, DEFAULT_LOAD_FACTOR),
        }
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current bucket count. Always a power of two.
    ///
    /// Diagnostic accessor, intended for tests and introspection.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the load factor controlling the growth trigger.
    ///
    /// Diagnostic accessor, intended for tests and introspection.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the entry count above which the next insertion grows the
    /// table, always `floor(capacity * load_factor)`.
    ///
    /// Diagnostic accessor, intended for tests and introspection.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        // Correct only while the bucket count is a power of two, which the
        // constructors and grow() maintain.
        (hash as usize) & (self.buckets.len() - 1)
    }

    /// Returns a reference to the entry matching `hash` and `eq`, if any.
    ///
    /// The chain is scanned linearly; the cached hash is compared before the
    /// predicate is called, so `eq` only runs on full 64-bit hash matches.
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let mut table: HashTable<&str> = HashTable::new();
    /// table.insert(7, "seven", |a, b| a == b);
    ///
    /// assert_eq!(table.find(7, |&v| v == "seven"), Some(&"seven"));
    /// assert_eq!(table.find(8, |&v| v == "seven"), None);
    /// ```
    pub fn find<F>(&self, hash: u64, mut eq: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self.bucket_index(hash);
        let mut cur = self.buckets[index].as_deref();
        while let Some(node) = cur {
            if node.hash == hash && eq(&node.value) {
                return Some(&node.value);
            }
            cur = node.next.as_deref();
        }
        None
    }

    /// Returns a mutable reference to the entry matching `hash` and `eq`, if
    /// any.
    pub fn find_mut<F>(&mut self, hash: u64, mut eq: F) -> Option<&mut T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self.bucket_index(hash);
        let mut cur = &mut self.buckets[index];
        while let Some(node) = cur {
            if node.hash == hash && eq(&node.value) {
                return Some(&mut node.value);
            }
            cur = &mut node.next;
        }
        None
    }

    /// Inserts `value` under `hash`, returning the entry it displaced.
    ///
    /// `eq(stored, new)` decides whether a stored entry is a duplicate of the
    /// new one. On a duplicate the stored entry is replaced in place: the
    /// length is unchanged and no growth check runs. Otherwise the new entry
    /// is linked as the head of its chain (the most recently inserted entry
    /// in a bucket is scanned first), and the table grows once the length
    /// exceeds the threshold -- after the insertion has completed.
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let mut table: HashTable<(u32, char)> = HashTable::new();
    ///
    /// assert_eq!(table.insert(9, (1, 'a'), |s, n| s.0 == n.0), None);
    /// assert_eq!(table.insert(9, (1, 'b'), |s, n| s.0 == n.0), Some((1, 'a')));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn insert<F>(&mut self, hash: u64, value: T, mut eq: F) -> Option<T>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let index = self.bucket_index(hash);

        let mut cur = &mut self.buckets[index];
        while let Some(node) = cur {
            if node.hash == hash && eq(&node.value, &value) {
                return Some(mem::replace(&mut node.value, value));
            }
            cur = &mut node.next;
        }

        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Node { hash, value, next }));
        self.len += 1;
        if self.len > self.threshold {
            self.grow();
        }
        None
    }

    /// Removes and returns the entry matching `hash` and `eq`, if any.
    ///
    /// Removal never shrinks the table; capacity only grows.
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// let mut table: HashTable<&str> = HashTable::new();
    /// table.insert(3, "three", |a, b| a == b);
    ///
    /// assert_eq!(table.remove(3, |&v| v == "three"), Some("three"));
    /// assert_eq!(table.remove(3, |&v| v == "three"), None);
    /// ```
    pub fn remove<F>(&mut self, hash: u64, mut eq: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self.bucket_index(hash);
        let mut cur = &mut self.buckets[index];
        loop {
            match cur {
                None => return None,
                Some(node) if node.hash == hash && eq(&node.value) => {
                    let next = node.next.take();
                    let unlinked = mem::replace(cur, next)?;
                    self.len -= 1;
                    return Some(unlinked.value);
                }
                Some(node) => cur = &mut node.next,
            }
        }
    }

    /// Doubles the bucket array and relinks every entry by its cached hash.
    ///
    /// The replacement array is allocated before any node is unlinked, so an
    /// allocation failure aborts without touching the existing table. Entries
    /// are moved, never copied; relative chain order after growth is the
    /// reverse of old-chain traversal order and is not guaranteed stable.
    fn grow(&mut self) {
        let new_capacity = self
            .capacity()
            .checked_mul(2)
            .expect("allocation size overflow");
        let old = mem::replace(&mut self.buckets, alloc_buckets(new_capacity));
        self.threshold = threshold_for(new_capacity, self.load_factor);

        let mask = new_capacity - 1;
        for slot in old.into_vec() {
            let mut cur = slot;
            while let Some(mut node) = cur {
                cur = node.next.take();
                let index = (node.hash as usize) & mask;
                node.next = self.buckets[index].take();
                self.buckets[index] = Some(node);
            }
        }
    }

    /// Removes every entry while retaining the current capacity, load factor,
    /// and threshold. No-op on an empty table.
    ///
    /// Chains are torn down iteratively, so a pathological chain cannot
    /// overflow the stack during teardown.
    pub fn clear(&mut self) {
        if self.len == 0 {
            return;
        }
        for slot in self.buckets.iter_mut() {
            let mut cur = slot.take();
            while let Some(mut node) = cur {
                cur = node.next.take();
            }
        }
        self.len = 0;
    }

    /// Removes every entry and returns the table to its just-constructed
    /// state: default capacity and default threshold.
    ///
    /// Unlike [`clear`](Self::clear), this releases bucket-array memory
    /// acquired through prior growth. Idempotent.
    pub fn reset(&mut self) {
        self.clear();
        if self.capacity() != DEFAULT_CAPACITY {
            self.buckets = alloc_buckets(DEFAULT_CAPACITY);
            self.threshold = threshold_for(DEFAULT_CAPACITY, self.load_factor);
        }
    }
}

impl<T> Default for HashTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for HashTable<T> {
    fn drop(&mut self) {
        // clear() unlinks nodes iteratively; the derived drop would recurse
        // chain links and can blow the stack on degenerate chains.
        self.clear();
    }
}

impl<T> Debug for HashTable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
