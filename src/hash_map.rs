use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::hash_table::HashTable;

/// A hash map implemented on the separate-chaining [`HashTable`].
///
/// `HashMap<K, V, S>` stores key-value pairs where keys implement
/// `Hash + Eq`, using a configurable hasher builder `S` to hash keys. Each
/// key is hashed exactly once per operation; the 64-bit hash is cached inside
/// the entry and reused for every chain comparison and for redistribution
/// when the table grows.
///
/// The map is move-only: it does not implement `Clone`, so exactly one owner
/// exists for a given map's storage. There is deliberately no iteration or
/// entry enumeration surface.
///
/// ## Example
///
/// ```rust
/// use chain_hash::HashMap;
///
/// let mut map: HashMap<&str, i32> = HashMap::new();
/// map.insert("alpha", 1);
/// map.insert("beta", 2);
///
/// assert_eq!(map.get(&"alpha"), Some(&1));
/// assert_eq!(map.len(), 2);
///
/// assert_eq!(map.remove(&"beta"), Some(2));
/// assert_eq!(map.get(&"beta"), None);
/// ```
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: HashTable<(K, V)>,
    hash_builder: S,
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash map with the given hasher builder.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// use std::collections::hash_map::RandomState;
    ///
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(RandomState::new());
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        HashMap {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a new hash map with at least `capacity` buckets and the given
    /// hasher builder.
    ///
    /// The bucket count is rounded up to a power of two, so the actual
    /// capacity may be larger than requested.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        HashMap {
            table: HashTable::with_capacity(capacity),
            hash_builder,
        }
    }

    /// Returns the number of key-value pairs in the map.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no key-value pairs.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the current bucket count. Always a power of two.
    ///
    /// Diagnostic accessor, intended for tests and introspection; not part of
    /// the primary map contract.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the load factor controlling the growth trigger.
    ///
    /// Diagnostic accessor, intended for tests and introspection.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the entry count above which the next insertion grows the map.
    ///
    /// Diagnostic accessor, intended for tests and introspection.
    pub fn threshold(&self) -> usize {
        self.table.threshold()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned. If it
    /// did, the value is overwritten in place and the old value is returned;
    /// the length is unchanged and no growth check runs. A new key links its
    /// entry at the head of the target chain and may grow the map once the
    /// insertion has completed.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.hash_builder.hash_one(&key);
        self.table
            .insert(hash, (key, value), |(stored, _), (new, _)| stored == new)
            .map(|(_, old)| old)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// Absence of a key is a normal outcome, reported as `None`.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<i32, i32> = HashMap::new();
    /// map.insert(1, 10);
    /// if let Some(v) = map.get_mut(&1) {
    ///     *v += 5;
    /// }
    /// assert_eq!(map.get(&1), Some(&15));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.find_mut(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// Removing never shrinks the map; capacity only grows.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k == key).map(|(_, v)| v)
    }

    /// Removes all key-value pairs while retaining the current capacity and
    /// threshold.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Removes all key-value pairs and returns the map to its
    /// just-constructed state, releasing bucket memory acquired through prior
    /// growth.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// let mut map: HashMap<i32, i32> = HashMap::new();
    /// for i in 0..100 {
    ///     map.insert(i, i);
    /// }
    /// assert!(map.capacity() > 16);
    ///
    /// map.reset();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 16);
    /// ```
    pub fn reset(&mut self) {
        self.table.reset();
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash map using the default hasher builder.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new hash map with at least `capacity` buckets using the
    /// default hasher builder.
    ///
    /// ```rust
    /// # use chain_hash::HashMap;
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert_eq!(map.capacity(), 128);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Debug for HashMap<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashMap")
            .field("len", &self.table.len())
            .field("capacity", &self.table.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;

    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Hashes a `u64` key to itself, giving tests full control over bucket
    /// placement.
    #[derive(Default)]
    struct IdentityHashBuilder;

    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, _bytes: &[u8]) {}

        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
    }

    impl BuildHasher for IdentityHashBuilder {
        type Hasher = IdentityHasher;

        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher(0)
        }
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);

        let map2 = HashMap::<i32, String, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
    }

    #[test]
    fn test_default_geometry() {
        let map: HashMap<i32, i32, SipHashBuilder> = HashMap::new();
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.load_factor(), 0.75);
        assert_eq!(map.threshold(), 12);
    }

    #[test]
    fn test_with_capacity() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::with_capacity(100);
        assert_eq!(map.capacity(), 128);
        assert!(map.is_empty());
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert_eq!(map.insert(1, "hello".to_string()), None);
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&1), Some(&"hello".to_string()));
        assert_eq!(map.get(&2), None);
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        assert_eq!(map.insert(1, "hello".to_string()), None);
        assert_eq!(
            map.insert(1, "world".to_string()),
            Some("hello".to_string())
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"world".to_string()));
    }

    #[test]
    fn test_get_mut() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_contains_key() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        assert!(!map.contains_key(&1));

        map.insert(1, "value".to_string());
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.remove(&1), Some("hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove(&3), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_distinct_inserts_track_len() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..500 {
            map.insert(i, i * 2);
        }
        assert_eq!(map.len(), 500);
        for i in 0..500 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
    }

    #[test]
    fn test_clear_retains_capacity() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.insert(i, i);
        }
        let capacity = map.capacity();
        let threshold = map.threshold();

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert_eq!(map.threshold(), threshold);
        for i in 0..100 {
            assert_eq!(map.get(&i), None);
        }

        // Idempotent.
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        for i in 0..100 {
            map.insert(i, i);
        }
        assert!(map.capacity() > 16);

        map.reset();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.threshold(), 12);

        // Idempotent, and the map stays usable.
        map.reset();
        assert_eq!(map.capacity(), 16);
        map.insert(1, 1);
        assert_eq!(map.get(&1), Some(&1));
    }

    #[test]
    fn test_growth_at_thirteen_distinct_keys() {
        let mut map: HashMap<u64, u64, _> = HashMap::with_hasher(IdentityHashBuilder);

        for i in 0..12 {
            map.insert(i, i * 10);
        }
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.threshold(), 12);

        map.insert(12, 120);
        assert_eq!(map.capacity(), 32);
        assert_eq!(map.threshold(), 24);

        for i in 0..13 {
            assert_eq!(map.get(&i), Some(&(i * 10)));
        }
    }

    #[test]
    fn test_mask_collisions_are_independent() {
        // With the identity hasher, 1 and 17 share bucket 1 at capacity 16.
        let mut map: HashMap<u64, &str, _> = HashMap::with_hasher(IdentityHashBuilder);
        map.insert(1, "one");
        map.insert(17, "seventeen");

        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&17), Some(&"seventeen"));

        assert_eq!(map.remove(&17), Some("seventeen"));
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&17), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_overwrite_does_not_grow() {
        let mut map: HashMap<u64, u64, _> = HashMap::with_hasher(IdentityHashBuilder);
        for i in 0..12 {
            map.insert(i, i);
        }
        assert_eq!(map.capacity(), 16);

        // Length sits exactly at the threshold; overwrites must not trigger
        // a growth check.
        for i in 0..12 {
            assert_eq!(map.insert(i, i + 1), Some(i));
        }
        assert_eq!(map.len(), 12);
        assert_eq!(map.capacity(), 16);
    }

    #[test]
    fn test_repeated_growth() {
        let mut map: HashMap<u64, u64, _> = HashMap::with_hasher(IdentityHashBuilder);
        for i in 0..25 {
            map.insert(i, i);
        }
        assert_eq!(map.capacity(), 64);
        assert_eq!(map.threshold(), 48);
        for i in 0..25 {
            assert_eq!(map.get(&i), Some(&i));
        }
    }

    #[test]
    fn test_string_keys() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert("denis".to_string(), 23);
        map.insert("anna".to_string(), 25);

        assert_eq!(map.get(&"denis".to_string()), Some(&23));
        assert_eq!(map.get(&"anna".to_string()), Some(&25));
        assert_eq!(map.get(&"ghost".to_string()), None);
    }

    #[test]
    fn test_remove_after_clear() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert("some", 1);
        map.clear();
        assert_eq!(map.remove(&"some"), None);
    }

    #[test]
    fn test_insert_remove_cycles() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());

        for cycle in 0..10u32 {
            for i in 0..50u32 {
                map.insert(i, cycle * 50 + i);
            }
            for i in 0..50u32 {
                assert_eq!(map.remove(&i), Some(cycle * 50 + i));
            }
            assert!(map.is_empty());
        }
    }

    #[cfg(feature = "foldhash")]
    #[test]
    fn test_default_hasher() {
        let mut map: HashMap<u64, &str> = HashMap::new();
        map.insert(1u64, "one");
        map.insert(2u64, "two");
        assert_eq!(map.get(&1), Some(&"one"));
        assert_eq!(map.get(&2), Some(&"two"));

        let map2: HashMap<u64, u64> = HashMap::default();
        assert!(map2.is_empty());
    }

    #[test]
    fn test_complex_values() {
        let mut map = HashMap::with_hasher(SipHashBuilder::default());
        map.insert(1, alloc::vec![1, 2, 3]);
        map.insert(2, alloc::vec![4, 5]);

        assert_eq!(map.get(&1), Some(&alloc::vec![1, 2, 3]));
        map.get_mut(&1).unwrap().push(4);
        assert_eq!(map.get(&1), Some(&alloc::vec![1, 2, 3, 4]));
    }
}
