//! The contract shared by every LRU cache variant.
//!
//! Only [`RecencyCache::get`] and [`RecencyCache::put`] change state. The
//! remaining methods are read-only views used by tests and the replay
//! harness; none of them touch recency order.

/// A fixed-capacity cache with least-recently-used eviction.
///
/// Implementations must agree on every observable result for any sequence
/// of calls; they may differ only in memory layout.
pub trait RecencyCache<K, V> {
    /// Look up `key`, promoting it to most-recently used on a hit.
    ///
    /// Returns a copy of the stored value, or `None` with no side effects.
    fn get(&mut self, key: &K) -> Option<V>;

    /// Insert or update `key`.
    ///
    /// Updating a resident key promotes it and never evicts. Inserting a new
    /// key into a full cache first evicts the least-recently used entry.
    fn put(&mut self, key: K, value: V);

    /// Copy of the value for `key` without promoting it.
    fn peek(&self, key: &K) -> Option<V>;

    /// True if `key` is resident. Does not promote.
    fn contains_key(&self, key: &K) -> bool;

    /// Number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries, fixed at construction.
    fn capacity(&self) -> usize;

    /// Resident keys ordered from least- to most-recently used.
    fn keys_lru(&self) -> Vec<K>;
}
