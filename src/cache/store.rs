//! Cache Store Module
//!
//! The cache engine: HashMap storage combined with access-order tracking and
//! read-time TTL expiry. Generic over the cached value so each scraper client
//! can cache whatever its parse step produces.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::{AccessOrder, CacheEntry, CacheStats, MAX_KEY_LENGTH};
use crate::error::{ResilienceError, Result};

// == TTL Cache ==
/// Bounded key/value cache with per-entry TTL and LRU eviction.
///
/// Expiry is enforced entirely at read time plus opportunistic eviction at
/// write time; no background sweeper is needed for correctness. Size never
/// exceeds `max_entries` and no value is returned at or past its expiry.
#[derive(Debug)]
pub struct TtlCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Access recency tracker
    order: AccessOrder,
    /// Performance counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL in milliseconds applied when `set` is called without one
    default_ttl_ms: u64,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates a cache holding at most `max_entries` values.
    ///
    /// Fails fast on a zero capacity or zero default TTL; neither is
    /// recoverable at runtime.
    pub fn new(max_entries: usize, default_ttl_ms: u64) -> Result<Self> {
        if max_entries == 0 {
            return Err(ResilienceError::InvalidConfig(
                "cache max_entries must be at least 1".to_string(),
            ));
        }
        if default_ttl_ms == 0 {
            return Err(ResilienceError::InvalidConfig(
                "cache default_ttl_ms must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::new(),
            order: AccessOrder::new(),
            stats: CacheStats::new(max_entries),
            max_entries,
            default_ttl_ms,
        })
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None when the key is absent or its TTL has elapsed; an expired
    /// entry is removed on the spot. A hit bumps the key's access recency.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.order.forget(key);
            self.stats.set_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch();
        let value = entry.value.clone();
        self.order.mark_used(key);
        self.stats.record_hit();
        Some(value)
    }

    // == Set ==
    /// Stores a value under `key`, overwriting any previous entry.
    ///
    /// The key becomes most-recently-used. When the insert pushes the cache
    /// past capacity, least-recently-used entries are evicted until size is
    /// back within bounds.
    pub fn set(&mut self, key: String, value: V, ttl_ms: Option<u64>) -> Result<()> {
        if key.is_empty() {
            return Err(ResilienceError::InvalidRequest(
                "Cache key cannot be empty".to_string(),
            ));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(ResilienceError::InvalidRequest(format!(
                "Cache key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        let entry = CacheEntry::new(value, ttl_ms.unwrap_or(self.default_ttl_ms));
        self.entries.insert(key.clone(), entry);
        self.order.mark_used(&key);

        // Evict coldest entries until back within capacity
        while self.entries.len() > self.max_entries {
            if let Some(cold) = self.order.pop_lru() {
                self.entries.remove(&cold);
                self.stats.record_eviction();
                debug!(key = %cold, "Evicted least recently used entry");
            } else {
                break;
            }
        }

        self.stats.set_entries(self.entries.len());
        Ok(())
    }

    // == Clear ==
    /// Removes every entry. Hit/miss/eviction counters are preserved.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order = AccessOrder::new();
        self.stats.set_entries(0);
    }

    // == Purge Expired ==
    /// Removes all entries whose TTL has elapsed.
    ///
    /// Returns the number of entries removed. Read-time expiry already keeps
    /// the cache correct; this exists so a periodic sweep can release memory
    /// held by keys nobody asks for again.
    pub fn purge_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.order.forget(key);
        }

        self.stats.set_entries(self.entries.len());
        expired.len()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
