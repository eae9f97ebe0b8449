//! Token Bucket Module
//!
//! Smooth-consumption alternative to the sliding window: a bucket of
//! capacity C refilled continuously at r tokens per second of wall-clock
//! time. Callers that prefer steady pacing over windowed bursts use this.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::clock::now_ms;
use crate::error::{ResilienceError, Result};

/// Fixed poll interval for `wait_and_consume`, in milliseconds.
const POLL_INTERVAL_MS: u64 = 20;

// == Token Bucket Stats ==
/// Observability snapshot of a bucket.
#[derive(Debug, Clone, Serialize)]
pub struct TokenBucketStats {
    /// Tokens currently available
    pub tokens: f64,
    /// Bucket capacity
    pub capacity: f64,
    /// Refill rate in tokens per second
    pub refill_rate: f64,
    /// Fraction of capacity currently spent
    pub utilization: f64,
}

// == Bucket State ==
#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill_ms: u64,
}

// == Token Bucket ==
/// Token-bucket rate limiter with continuous wall-clock refill.
///
/// Cheap to clone; clones share the same bucket.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    state: Arc<Mutex<BucketState>>,
}

impl TokenBucket {
    // == Constructor ==
    /// Creates a full bucket of `capacity` tokens refilling at
    /// `refill_rate` tokens per second.
    pub fn new(capacity: u32, refill_rate: f64) -> Result<Self> {
        if capacity == 0 {
            return Err(ResilienceError::InvalidConfig(
                "token bucket capacity must be at least 1".to_string(),
            ));
        }
        if refill_rate <= 0.0 {
            return Err(ResilienceError::InvalidConfig(format!(
                "token bucket refill_rate must be positive, got {}",
                refill_rate
            )));
        }

        Ok(Self {
            capacity: capacity as f64,
            refill_rate,
            state: Arc::new(Mutex::new(BucketState {
                tokens: capacity as f64,
                last_refill_ms: now_ms(),
            })),
        })
    }

    // == Consume ==
    /// Takes `n` tokens if available after refill. Returns false otherwise;
    /// nothing is deducted on failure.
    pub async fn consume(&self, n: u32) -> bool {
        let mut state = self.state.lock().await;
        self.refill(&mut state);

        if state.tokens >= n as f64 {
            state.tokens -= n as f64;
            true
        } else {
            debug!(
                wanted = n,
                available = state.tokens,
                "Token bucket exhausted"
            );
            false
        }
    }

    // == Wait And Consume ==
    /// Polls at a fixed short interval until `n` tokens can be taken.
    ///
    /// Requests for more tokens than the bucket can ever hold would wait
    /// forever, so they fail fast instead.
    pub async fn wait_and_consume(&self, n: u32) -> Result<()> {
        if n as f64 > self.capacity {
            return Err(ResilienceError::InvalidRequest(format!(
                "Cannot consume {} tokens from a bucket of capacity {}",
                n, self.capacity
            )));
        }

        loop {
            if self.consume(n).await {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    }

    // == Stats ==
    /// Returns a snapshot after refilling to the current instant.
    pub async fn stats(&self) -> TokenBucketStats {
        let mut state = self.state.lock().await;
        self.refill(&mut state);

        TokenBucketStats {
            tokens: state.tokens,
            capacity: self.capacity,
            refill_rate: self.refill_rate,
            utilization: 1.0 - state.tokens / self.capacity,
        }
    }

    // == Reset ==
    /// Refills the bucket to capacity.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.tokens = self.capacity;
        state.last_refill_ms = now_ms();
    }

    // == Refill ==
    /// Credits tokens for the wall-clock time elapsed since the last refill.
    fn refill(&self, state: &mut BucketState) {
        let now = now_ms();
        let elapsed_secs = now.saturating_sub(state.last_refill_ms) as f64 / 1_000.0;
        state.tokens = (state.tokens + elapsed_secs * self.refill_rate).min(self.capacity);
        state.last_refill_ms = now;
    }
}
