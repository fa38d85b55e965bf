//! Strict least-recently-used cache
//!
//! This module provides `LruCache`, a capacity-bounded map with strict LRU
//! eviction: `get` marks the entry most-recently-used, and inserting past
//! capacity evicts exactly the least-recently-used entry.
//!
//! # Design
//!
//! Recency is tracked with a monotonic tick per entry rather than a linked
//! list: `get` and `put` are O(1), eviction scans for the stalest tick and
//! is linear in capacity. Capacities here are in the hundreds to thousands,
//! and eviction only runs on overflow.
//!
//! The cache is single-threaded by itself; concurrent callers go through
//! [`ResultCache`](crate::cache::ResultCache), which guards one of these
//! behind a mutex. Strict LRU needs a single global recency order, so a
//! sharded map cannot back it.

use std::collections::HashMap;
use std::hash::Hash;

/// Value slot with its recency tick
#[derive(Debug)]
struct Slot<V> {
    value: V,
    last_used: u64,
}

/// Capacity-bounded map with strict least-recently-used eviction
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Maximum number of entries; never exceeded after `put` returns
    capacity: usize,

    /// Monotonic recency clock, bumped on every access
    tick: u64,

    entries: HashMap<K, Slot<V>>,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create a cache bounded at `capacity` entries
    ///
    /// A zero capacity is clamped to one entry so the cache is always usable.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
        }
    }

    /// Look up a key, marking the entry most-recently-used on a hit
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(key).map(|slot| {
            slot.last_used = tick;
            &slot.value
        })
    }

    /// Insert or update an entry, evicting the least-recently-used entry
    /// if the insert pushed the cache over capacity
    pub fn put(&mut self, key: K, value: V) {
        self.tick += 1;
        let tick = self.tick;
        self.entries.insert(
            key,
            Slot {
                value,
                last_used: tick,
            },
        );

        if self.entries.len() > self.capacity {
            self.evict_stalest();
        }
    }

    /// Whether a key is present, without touching recency
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity bound
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn evict_stalest(&mut self) {
        let stalest = self
            .entries
            .iter()
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = stalest {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut cache = LruCache::new(4);
        cache.put("a", 1);
        cache.put("b", 2);

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_put_updates_existing_entry() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("a", 10);

        assert_eq!(cache.get(&"a"), Some(&10));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overflow_evicts_least_recently_used() {
        let mut cache = LruCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);

        // "a" is the stalest entry; inserting a fourth evicts exactly it
        cache.put("d", 4);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(&2));
        assert_eq!(cache.get(&"c"), Some(&3));
        assert_eq!(cache.get(&"d"), Some(&4));
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut cache = LruCache::new(3);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);

        // Touch "a" so "b" becomes the least-recently-used entry
        assert_eq!(cache.get(&"a"), Some(&1));

        cache.put("d", 4);

        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"c"), Some(&3));
        assert_eq!(cache.get(&"d"), Some(&4));
    }

    #[test]
    fn test_put_refreshes_recency() {
        let mut cache = LruCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);

        // Re-inserting "a" makes "b" the eviction candidate
        cache.put("a", 10);
        cache.put("c", 3);

        assert_eq!(cache.get(&"a"), Some(&10));
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"c"), Some(&3));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut cache = LruCache::new(5);
        for i in 0..100u32 {
            cache.put(i, i);
            assert!(cache.len() <= 5);
        }
        assert_eq!(cache.len(), 5);

        // The five most recent entries survive
        for i in 95..100u32 {
            assert!(cache.contains_key(&i));
        }
    }

    #[test]
    fn test_zero_capacity_clamped_to_one() {
        let mut cache = LruCache::new(0);
        assert_eq!(cache.capacity(), 1);

        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"b"), Some(&2));
    }
}
