//! Wall-clock helpers
//!
//! All timestamps in the toolkit are Unix milliseconds. Sliding windows,
//! TTL expiry, and circuit reset timeouts share this single clock source.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current Unix timestamp in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
