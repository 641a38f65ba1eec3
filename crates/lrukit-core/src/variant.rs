//! Runtime selection between the two cache variants.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arena_cache::ArenaLruCache;
use crate::config::CacheConfig;
use crate::contract::RecencyCache;
use crate::error::CacheError;
use crate::linked_cache::LinkedLruCache;

/// Which recency-list strategy backs a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheVariant {
    /// Ordered container with stable node positions ([`LinkedLruCache`]).
    Linked,
    /// Fixed node pool with sentinels and a free list ([`ArenaLruCache`]).
    #[default]
    Arena,
}

impl CacheVariant {
    pub const ALL: [Self; 2] = [Self::Linked, Self::Arena];

    /// Type name of the cache this variant builds.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Linked => "LinkedLruCache",
            Self::Arena => "ArenaLruCache",
        }
    }
}

impl fmt::Display for CacheVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linked => write!(f, "linked"),
            Self::Arena => write!(f, "arena"),
        }
    }
}

impl FromStr for CacheVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linked" | "a" => Ok(Self::Linked),
            "arena" | "b" => Ok(Self::Arena),
            _ => Err(format!(
                "unknown cache variant: {s}. Expected one of: linked, arena"
            )),
        }
    }
}

/// A cache of either variant behind one type.
#[derive(Debug)]
pub enum LruCache<K, V> {
    Linked(LinkedLruCache<K, V>),
    Arena(ArenaLruCache<K, V>),
}

impl<K: Hash + Eq + Clone, V: Clone> LruCache<K, V> {
    pub fn with_variant(variant: CacheVariant, capacity: usize) -> Result<Self, CacheError> {
        Ok(match variant {
            CacheVariant::Linked => Self::Linked(LinkedLruCache::new(capacity)?),
            CacheVariant::Arena => Self::Arena(ArenaLruCache::new(capacity)?),
        })
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Self::with_variant(config.variant, config.capacity)
    }

    pub fn variant(&self) -> CacheVariant {
        match self {
            Self::Linked(_) => CacheVariant::Linked,
            Self::Arena(_) => CacheVariant::Arena,
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> RecencyCache<K, V> for LruCache<K, V> {
    fn get(&mut self, key: &K) -> Option<V> {
        match self {
            Self::Linked(cache) => cache.get(key),
            Self::Arena(cache) => cache.get(key),
        }
    }

    fn put(&mut self, key: K, value: V) {
        match self {
            Self::Linked(cache) => cache.put(key, value),
            Self::Arena(cache) => cache.put(key, value),
        }
    }

    fn peek(&self, key: &K) -> Option<V> {
        match self {
            Self::Linked(cache) => cache.peek(key),
            Self::Arena(cache) => cache.peek(key),
        }
    }

    fn contains_key(&self, key: &K) -> bool {
        match self {
            Self::Linked(cache) => cache.contains_key(key),
            Self::Arena(cache) => cache.contains_key(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Linked(cache) => cache.len(),
            Self::Arena(cache) => cache.len(),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Self::Linked(cache) => cache.capacity(),
            Self::Arena(cache) => cache.capacity(),
        }
    }

    fn keys_lru(&self) -> Vec<K> {
        match self {
            Self::Linked(cache) => cache.keys_lru(),
            Self::Arena(cache) => cache.keys_lru(),
        }
    }
}
