//! Arena-backed LRU cache with a fixed node pool.
//!
//! The recency list lives in a `Vec<Node>` of `capacity + 2` slots that is
//! allocated once at construction and never grows. Slot 0 is the head
//! sentinel (its successor is the least-recently used entry) and slot 1 is
//! the tail sentinel (its predecessor is the most-recently used entry).
//! Unused data slots are chained through `next` into a free list, so
//! eviction and insertion recycle slots without touching the allocator.
//!
//! A `HashMap<K, usize>` maps keys to their slot. Slot numbers never leave
//! this module.
//!
//! # Example
//! ```
//! use lrukit_core::arena_cache::ArenaLruCache;
//! use lrukit_core::RecencyCache;
//!
//! let mut cache = ArenaLruCache::new(2).unwrap();
//! cache.put(1, "one");
//! cache.put(2, "two");
//! assert_eq!(cache.get(&1), Some("one"));
//!
//! cache.put(3, "three"); // evicts key=2, key=1 was just promoted
//! assert_eq!(cache.get(&2), None);
//! ```

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::contract::RecencyCache;
use crate::error::CacheError;

const HEAD: usize = 0;
const TAIL: usize = 1;
const FIRST_DATA_SLOT: usize = 2;
/// Terminates the free list and marks unlinked `prev` fields.
const NIL: usize = usize::MAX;

/// A pool slot. Sentinels and free slots carry no entry.
#[derive(Debug)]
struct Node<K, V> {
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

impl<K, V> Node<K, V> {
    fn vacant(prev: usize, next: usize) -> Self {
        Self {
            entry: None,
            prev,
            next,
        }
    }
}

/// Problems found by [`ArenaLruCache::check_invariants`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvariantReport {
    pub violations: Vec<String>,
}

impl InvariantReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, violation: String) {
        self.violations.push(violation);
    }
}

/// Bounded LRU cache over a pre-allocated node pool.
pub struct ArenaLruCache<K, V> {
    capacity: usize,
    /// Key → pool slot.
    map: HashMap<K, usize>,
    /// Sentinels at `HEAD`/`TAIL`, data slots after them.
    pool: Vec<Node<K, V>>,
    /// First unused data slot, or `NIL` when every slot is linked.
    free_head: usize,
}

impl<K, V> std::fmt::Debug for ArenaLruCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaLruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .field("pool_slots", &self.pool.len())
            .finish()
    }
}

impl<K: Hash + Eq + Clone, V: Clone> ArenaLruCache<K, V> {
    /// Create an empty cache and its full node pool.
    ///
    /// Fails with [`CacheError::ZeroCapacity`] for `capacity == 0`, and with
    /// [`CacheError::CapacityOverflow`] when the pool cannot be sized.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let slots = crate::check_capacity(capacity)?;

        let mut pool = Vec::new();
        pool.try_reserve_exact(slots)
            .map_err(|_| CacheError::CapacityOverflow(capacity))?;
        let mut map = HashMap::new();
        map.try_reserve(capacity)
            .map_err(|_| CacheError::CapacityOverflow(capacity))?;

        pool.push(Node::vacant(HEAD, TAIL));
        pool.push(Node::vacant(HEAD, TAIL));
        for slot in FIRST_DATA_SLOT..slots {
            let next = if slot + 1 < slots { slot + 1 } else { NIL };
            pool.push(Node::vacant(NIL, next));
        }

        tracing::debug!(capacity, slots, "arena LRU cache created");

        Ok(Self {
            capacity,
            map,
            pool,
            free_head: FIRST_DATA_SLOT,
        })
    }

    /// Iterate from least-recently used to most-recently used.
    pub fn iter_lru(&self) -> LruIter<'_, K, V> {
        LruIter {
            pool: &self.pool,
            current: self.pool[HEAD].next,
            remaining: self.map.len(),
        }
    }

    /// Iterate from most-recently used to least-recently used.
    pub fn iter_mru(&self) -> MruIter<'_, K, V> {
        MruIter {
            pool: &self.pool,
            current: self.pool[TAIL].prev,
            remaining: self.map.len(),
        }
    }

    /// Audit the pool: sentinel linkage, prev/next agreement, index ↔ slot
    /// agreement, and that every data slot is either linked or free, never
    /// both.
    pub fn check_invariants(&self) -> InvariantReport {
        let mut report = InvariantReport::default();

        if self.pool.len() != self.capacity + FIRST_DATA_SLOT {
            report.push(format!(
                "pool has {} slots, expected {}",
                self.pool.len(),
                self.capacity + FIRST_DATA_SLOT
            ));
            return report;
        }

        let mut linked = HashSet::with_capacity(self.map.len());
        let mut prev = HEAD;
        let mut current = self.pool[HEAD].next;
        while current != TAIL {
            if current < FIRST_DATA_SLOT || current >= self.pool.len() {
                report.push(format!("list reaches invalid slot {current} after {prev}"));
                return report;
            }
            if !linked.insert(current) {
                report.push(format!("slot {current} is linked twice"));
                return report;
            }
            let node = &self.pool[current];
            if node.prev != prev {
                report.push(format!(
                    "slot {current} has prev {} but follows {prev}",
                    node.prev
                ));
            }
            match &node.entry {
                Some((key, _)) => {
                    if self.map.get(key) != Some(&current) {
                        report.push(format!("index does not point at linked slot {current}"));
                    }
                }
                None => report.push(format!("linked slot {current} holds no entry")),
            }
            prev = current;
            current = node.next;
        }
        if self.pool[TAIL].prev != prev {
            report.push(format!(
                "tail sentinel has prev {} but last linked slot is {prev}",
                self.pool[TAIL].prev
            ));
        }
        if linked.len() != self.map.len() {
            report.push(format!(
                "{} slots linked but index holds {} keys",
                linked.len(),
                self.map.len()
            ));
        }
        if self.map.len() > self.capacity {
            report.push(format!(
                "{} entries exceed capacity {}",
                self.map.len(),
                self.capacity
            ));
        }

        let mut free = HashSet::new();
        let mut slot = self.free_head;
        while slot != NIL {
            if slot < FIRST_DATA_SLOT || slot >= self.pool.len() {
                report.push(format!("free list reaches invalid slot {slot}"));
                return report;
            }
            if linked.contains(&slot) {
                report.push(format!("slot {slot} is both linked and free"));
            }
            if !free.insert(slot) {
                report.push(format!("slot {slot} appears twice in the free list"));
                return report;
            }
            if self.pool[slot].entry.is_some() {
                report.push(format!("free slot {slot} still holds an entry"));
            }
            slot = self.pool[slot].next;
        }
        if linked.len() + free.len() != self.capacity {
            report.push(format!(
                "{} linked + {} free slots do not cover capacity {}",
                linked.len(),
                free.len(),
                self.capacity
            ));
        }

        report
    }

    // --- Pool operations ---

    fn assert_data_slot(&self, slot: usize) {
        debug_assert!(
            (FIRST_DATA_SLOT..self.pool.len()).contains(&slot),
            "slot {slot} outside data range {FIRST_DATA_SLOT}..{}",
            self.pool.len()
        );
    }

    /// Splice `slot` out of the recency list. Does not free it.
    fn unlink(&mut self, slot: usize) {
        self.assert_data_slot(slot);
        let prev = self.pool[slot].prev;
        let next = self.pool[slot].next;
        self.pool[prev].next = next;
        self.pool[next].prev = prev;
    }

    /// Splice `slot` in just before the tail sentinel (the MRU end).
    fn link_before_tail(&mut self, slot: usize) {
        self.assert_data_slot(slot);
        let prev = self.pool[TAIL].prev;
        self.pool[prev].next = slot;
        self.pool[slot].prev = prev;
        self.pool[slot].next = TAIL;
        self.pool[TAIL].prev = slot;
    }

    /// Pop a slot off the free list.
    fn allocate(&mut self) -> usize {
        let slot = self.free_head;
        assert!(
            slot != NIL,
            "node pool exhausted with {} of {} entries resident",
            self.map.len(),
            self.capacity
        );
        self.assert_data_slot(slot);
        self.free_head = self.pool[slot].next;
        slot
    }

    /// Push an unlinked slot back onto the free list.
    fn release(&mut self, slot: usize) {
        assert!(slot >= FIRST_DATA_SLOT, "sentinel slot {slot} cannot be released");
        self.assert_data_slot(slot);
        let node = &mut self.pool[slot];
        node.entry = None;
        node.prev = NIL;
        node.next = self.free_head;
        self.free_head = slot;
    }

    fn promote(&mut self, slot: usize) {
        if self.pool[TAIL].prev == slot {
            return;
        }
        self.unlink(slot);
        self.link_before_tail(slot);
    }

    /// Remove the entry at the LRU end and recycle its slot.
    fn evict_lru(&mut self) {
        let slot = self.pool[HEAD].next;
        assert!(slot != TAIL, "eviction requested from an empty cache");
        self.unlink(slot);
        let Some((key, _)) = self.pool[slot].entry.take() else {
            unreachable!("linked slot {slot} holds no entry");
        };
        self.map.remove(&key);
        self.release(slot);
        tracing::trace!(len = self.map.len(), "evicted least-recently used entry");
    }
}

impl<K: Hash + Eq + Clone, V: Clone> RecencyCache<K, V> for ArenaLruCache<K, V> {
    fn get(&mut self, key: &K) -> Option<V> {
        let slot = *self.map.get(key)?;
        self.promote(slot);
        self.pool[slot].entry.as_ref().map(|(_, value)| value.clone())
    }

    fn put(&mut self, key: K, value: V) {
        if let Some(&slot) = self.map.get(&key) {
            match self.pool[slot].entry.as_mut() {
                Some((_, stored)) => *stored = value,
                None => unreachable!("indexed slot {slot} holds no entry"),
            }
            self.promote(slot);
            return;
        }

        if self.map.len() == self.capacity {
            self.evict_lru();
        }

        let slot = self.allocate();
        self.pool[slot].entry = Some((key.clone(), value));
        self.link_before_tail(slot);
        self.map.insert(key, slot);
    }

    fn peek(&self, key: &K) -> Option<V> {
        self.map
            .get(key)
            .and_then(|&slot| self.pool[slot].entry.as_ref())
            .map(|(_, value)| value.clone())
    }

    fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn keys_lru(&self) -> Vec<K> {
        self.iter_lru().map(|(key, _)| key.clone()).collect()
    }
}

/// Iterator from least-recently used to most-recently used.
pub struct LruIter<'a, K, V> {
    pool: &'a [Node<K, V>],
    current: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for LruIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == TAIL || self.remaining == 0 {
            return None;
        }
        let node = &self.pool[self.current];
        self.current = node.next;
        self.remaining -= 1;
        node.entry.as_ref().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Iterator from most-recently used to least-recently used.
pub struct MruIter<'a, K, V> {
    pool: &'a [Node<K, V>],
    current: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for MruIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == HEAD || self.remaining == 0 {
            return None;
        }
        let node = &self.pool[self.current];
        self.current = node.prev;
        self.remaining -= 1;
        node.entry.as_ref().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache<K: Hash + Eq + Clone, V: Clone>(capacity: usize) -> ArenaLruCache<K, V> {
        ArenaLruCache::new(capacity).unwrap()
    }

    #[test]
    fn pool_is_sized_with_two_sentinels() {
        let c: ArenaLruCache<i32, i32> = cache(4);
        assert_eq!(c.pool.len(), 6);
        assert_eq!(c.pool[HEAD].next, TAIL);
        assert_eq!(c.pool[TAIL].prev, HEAD);
        assert!(c.check_invariants().is_clean());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = ArenaLruCache::<i32, i32>::new(0).unwrap_err();
        assert_eq!(err, CacheError::ZeroCapacity);
    }

    #[test]
    fn overflowing_capacity_is_rejected() {
        let err = ArenaLruCache::<i32, i32>::new(usize::MAX).unwrap_err();
        assert_eq!(err, CacheError::CapacityOverflow(usize::MAX));
    }

    #[test]
    fn basic_put_and_get() {
        let mut c = cache(3);
        c.put(1, "one");
        c.put(2, "two");
        c.put(3, "three");

        assert_eq!(c.get(&1), Some("one"));
        assert_eq!(c.get(&2), Some("two"));
        assert_eq!(c.get(&3), Some("three"));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn miss_has_no_side_effects() {
        let mut c = cache(2);
        c.put(1, "one");
        c.put(2, "two");
        let before = c.keys_lru();

        assert_eq!(c.get(&99), None);
        assert_eq!(c.get(&99), None);
        assert_eq!(c.keys_lru(), before);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn get_promotes_to_mru() {
        let mut c = cache(2);
        c.put(1, 1);
        c.put(2, 2);
        assert_eq!(c.get(&1), Some(1));
        c.put(3, 3);

        assert_eq!(c.get(&2), None);
        assert_eq!(c.keys_lru(), vec![1, 3]);
    }

    #[test]
    fn update_promotes_without_eviction() {
        let mut c = cache(3);
        c.put(1, "one");
        c.put(2, "two");
        c.put(3, "three");

        c.put(1, "ONE");

        assert_eq!(c.len(), 3);
        assert_eq!(c.peek(&1), Some("ONE"));
        let keys: Vec<_> = c.iter_mru().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 3, 2]);
    }

    #[test]
    fn peek_does_not_promote() {
        let mut c = cache(2);
        c.put(1, "one");
        c.put(2, "two");

        assert_eq!(c.peek(&1), Some("one"));
        c.put(3, "three");

        assert!(!c.contains_key(&1));
        assert!(c.contains_key(&2));
    }

    #[test]
    fn single_capacity_evicts_immediately() {
        let mut c = cache(1);
        c.put(1, 10);
        c.put(2, 20);

        assert_eq!(c.get(&1), None);
        assert_eq!(c.get(&2), Some(20));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn iter_orders_are_reverses() {
        let mut c = cache(4);
        for i in 0..4 {
            c.put(i, i * 10);
        }
        c.get(&1);

        let lru: Vec<_> = c.iter_lru().map(|(k, _)| *k).collect();
        let mut mru: Vec<_> = c.iter_mru().map(|(k, _)| *k).collect();
        mru.reverse();
        assert_eq!(lru, vec![0, 2, 3, 1]);
        assert_eq!(lru, mru);
        assert_eq!(c.iter_lru().size_hint(), (4, Some(4)));
    }

    #[test]
    fn eviction_recycles_pool_slots() {
        let mut c = cache(2);
        for round in 0..50 {
            c.put(round, round);
        }
        assert_eq!(c.pool.len(), 4);
        assert_eq!(c.keys_lru(), vec![48, 49]);
        assert!(c.check_invariants().is_clean());
    }

    #[test]
    fn free_list_drains_then_refills_by_eviction() {
        let mut c = cache(3);
        assert_eq!(c.free_head, FIRST_DATA_SLOT);
        c.put("a", 1);
        c.put("b", 2);
        c.put("c", 3);
        assert_eq!(c.free_head, NIL);

        c.put("d", 4);
        assert_eq!(c.free_head, NIL);
        assert_eq!(c.keys_lru(), vec!["b", "c", "d"]);
        assert!(c.check_invariants().is_clean());
    }

    #[test]
    fn invariants_hold_through_mixed_churn() {
        let mut c = cache(5);
        for i in 0..300u32 {
            c.put(i % 11, i);
            if i % 3 == 0 {
                c.get(&(i % 7));
            }
            let report = c.check_invariants();
            assert!(report.is_clean(), "step {i}: {:?}", report.violations);
        }
    }

    #[test]
    fn corrupted_link_is_reported() {
        let mut c = cache(3);
        c.put(1, 1);
        c.put(2, 2);
        let first = c.pool[HEAD].next;
        let second = c.pool[first].next;
        c.pool[second].prev = HEAD;

        let report = c.check_invariants();
        assert!(!report.is_clean());
        assert!(report.violations[0].contains(&format!("slot {second}")));
    }

    #[test]
    #[should_panic(expected = "sentinel slot")]
    fn releasing_a_sentinel_panics() {
        let mut c: ArenaLruCache<i32, i32> = cache(2);
        c.release(TAIL);
    }

    #[test]
    #[should_panic(expected = "node pool exhausted")]
    fn allocating_from_an_empty_free_list_panics() {
        let mut c = cache(1);
        c.put(1, 1);
        c.allocate();
    }

    #[test]
    #[should_panic(expected = "holds no entry")]
    fn evicting_an_empty_linked_slot_panics() {
        let mut c = cache(2);
        c.put(1, 1);
        c.put(2, 2);
        let lru = c.pool[HEAD].next;
        c.pool[lru].entry = None;
        c.put(3, 3);
    }

    #[test]
    fn string_keys_and_values() {
        let mut c = cache(2);
        c.put("hello".to_string(), "world".to_string());
        c.put("foo".to_string(), "bar".to_string());

        assert_eq!(c.get(&"hello".to_string()), Some("world".to_string()));
    }

    #[test]
    fn debug_output() {
        let mut c = cache(5);
        c.put(1, "one");
        let debug = format!("{:?}", c);
        assert!(debug.contains("ArenaLruCache"));
        assert!(debug.contains("capacity: 5"));
        assert!(debug.contains("len: 1"));
        assert!(debug.contains("pool_slots: 7"));
    }
}
