//! Time-to-live cache
//!
//! A concurrent map whose entries expire a fixed duration after insertion.
//! Expiry is evaluated against an injected [`Clock`], so tests can move time
//! forward without sleeping.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use ihub_domain::ports::Clock;
use std::hash::Hash;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// Concurrent cache with a single TTL for every entry
///
/// Expired entries are dropped lazily on read.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Value for `key` if it was inserted less than one TTL ago
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        {
            let entry = self.entries.get(key)?;
            if now - entry.inserted_at < self.ttl {
                return Some(entry.value.clone());
            }
        }
        // Read guard must be released before taking the shard write lock
        self.entries
            .remove_if(key, |_, entry| now - entry.inserted_at >= self.ttl);
        None
    }

    /// Insert or replace a value, restarting its TTL
    pub fn insert(&self, key: K, value: V) {
        let inserted_at = self.clock.now();
        self.entries.insert(key, CacheEntry { value, inserted_at });
    }

    /// Drop one entry
    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
