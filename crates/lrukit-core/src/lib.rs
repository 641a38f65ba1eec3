//! lrukit-core: fixed-capacity LRU caches with O(1) `get` and `put`.
//!
//! Two interchangeable strategies implement the same [`RecencyCache`]
//! contract:
//!
//! - [`LinkedLruCache`]: recency order kept by an ordered container
//!   (`hashlink::LinkedHashMap`) whose nodes keep their position while other
//!   entries come and go.
//! - [`ArenaLruCache`]: a hand-rolled doubly linked list over a node pool
//!   of `capacity + 2` slots (two sentinels) with a free list.
//!
//! Both must agree on every observable result; [`replay::compare_variants`]
//! checks that for a given operation script.
//!
//! # Modules
//!
//! - `contract`: the shared [`RecencyCache`] trait
//! - `linked_cache`: ordered-container variant
//! - `arena_cache`: node-pool variant and its invariant audit
//! - `variant`: [`CacheVariant`] selection and the [`LruCache`] enum
//! - `replay`: operation scripts and differential comparison
//! - `config`: `lrukit.toml` loading and validation
//! - `logging`: `tracing` subscriber setup
//! - `error`: error types
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod arena_cache;
pub mod config;
pub mod contract;
pub mod error;
pub mod linked_cache;
pub mod logging;
pub mod replay;
pub mod variant;

pub use arena_cache::{ArenaLruCache, InvariantReport};
pub use config::{CacheConfig, Config};
pub use contract::RecencyCache;
pub use error::{CacheError, ConfigError, Error, Result, ScriptError};
pub use linked_cache::LinkedLruCache;
pub use replay::{CacheOp, DifferentialReport, ReplayTrace, compare_variants, replay};
pub use variant::{CacheVariant, LruCache};

/// Sentinel slots every arena pool carries in addition to its capacity.
const SENTINEL_SLOTS: usize = 2;

/// Validate a requested capacity, returning the arena pool size for it.
///
/// Both variants go through this so they accept exactly the same range.
pub(crate) fn check_capacity(capacity: usize) -> std::result::Result<usize, CacheError> {
    if capacity == 0 {
        return Err(CacheError::ZeroCapacity);
    }
    capacity
        .checked_add(SENTINEL_SLOTS)
        .ok_or(CacheError::CapacityOverflow(capacity))
}
