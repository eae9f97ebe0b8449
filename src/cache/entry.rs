//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use crate::clock::now_ms;

// == Cache Entry ==
/// A single cached value with its expiry and access metadata.
///
/// Entries are owned exclusively by the cache. `last_accessed` is bumped on
/// every successful read so eviction can order entries by true access recency.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Last access timestamp (Unix milliseconds)
    pub last_accessed: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_ms` milliseconds from now.
    pub fn new(value: V, ttl_ms: u64) -> Self {
        let now = now_ms();
        Self {
            value,
            expires_at: now + ttl_ms,
            last_accessed: now,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to `expires_at`, so a value is never served at
    /// or past its expiry instant.
    pub fn is_expired(&self) -> bool {
        now_ms() >= self.expires_at
    }

    // == Touch ==
    /// Marks the entry as accessed now.
    pub fn touch(&mut self) {
        self.last_accessed = now_ms();
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds (0 once expired).
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(now_ms())
    }
}
