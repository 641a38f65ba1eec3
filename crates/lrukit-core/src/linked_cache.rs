//! LRU cache over an insertion-ordered linked hash map.
//!
//! The recency list is delegated to [`hashlink::LinkedHashMap`]: a hash
//! index whose entries are also threaded on a doubly linked list. Each key
//! resolves to its list node in O(1), and that node stays put while other
//! entries are inserted or removed, so moving one key to the back or popping
//! the front never disturbs the rest of the order. Front is LRU, back is MRU.

use std::hash::Hash;

use hashlink::LinkedHashMap;

use crate::contract::RecencyCache;
use crate::error::CacheError;

/// Bounded LRU cache backed by an ordered container.
pub struct LinkedLruCache<K, V> {
    capacity: usize,
    entries: LinkedHashMap<K, V>,
}

impl<K, V> std::fmt::Debug for LinkedLruCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedLruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<K: Hash + Eq + Clone, V: Clone> LinkedLruCache<K, V> {
    /// Create an empty cache holding at most `capacity` entries.
    ///
    /// Accepts exactly the capacities [`crate::ArenaLruCache::new`] accepts.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        crate::check_capacity(capacity)?;
        tracing::debug!(capacity, "linked LRU cache created");
        Ok(Self {
            capacity,
            entries: LinkedHashMap::new(),
        })
    }

    /// Iterate from least-recently used to most-recently used.
    pub fn iter_lru(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }
}

impl<K: Hash + Eq + Clone, V: Clone> RecencyCache<K, V> for LinkedLruCache<K, V> {
    fn get(&mut self, key: &K) -> Option<V> {
        self.entries.to_back(key).cloned()
    }

    fn put(&mut self, key: K, value: V) {
        if let Some(stored) = self.entries.to_back(&key) {
            *stored = value;
            return;
        }

        if self.entries.len() == self.capacity && self.entries.pop_front().is_some() {
            tracing::trace!(
                len = self.entries.len(),
                "evicted least-recently used entry"
            );
        }
        self.entries.insert(key, value);
    }

    fn peek(&self, key: &K) -> Option<V> {
        self.entries.get(key).cloned()
    }

    fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn keys_lru(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }
}
