//! Fetch Pipeline Module
//!
//! Composes the four primitives around a caller-supplied fetch+parse step.
//!
//! # Control Flow
//! ```text
//! fetch(key, op):
//!     cache hit                    → return cached value
//!     rate limiter admission       → suspends until a slot frees
//!     circuit breaker gate         → fast-fails while the upstream is down
//!     retry loop around op         → one breaker-visible attempt
//!     cache write on success       → later calls short-circuit
//! ```
//!
//! The fetch closure stays opaque: HTTP, HTML parsing, and response shaping
//! all belong to the scraper client, not to this crate.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::breaker::{BreakerConfig, BreakerError, CircuitBreaker};
use crate::cache::{CacheStats, TtlCache};
use crate::error::{ResilienceError, Result};
use crate::limiter::{AdaptiveRateLimiter, LimiterConfig};
use crate::retry::{RetryConfig, RetryManager};

// == Pipeline Config ==
/// Everything a source pipeline needs at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Cache capacity in entries
    pub cache_max_entries: usize,
    /// Cache TTL applied to fetched values, in milliseconds
    pub cache_ttl_ms: u64,
    /// Sliding-window limiter parameters
    pub limiter: LimiterConfig,
    /// Circuit breaker parameters
    pub breaker: BreakerConfig,
    /// Retry parameters for the raw fetch
    pub retry: RetryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_max_entries: 1_000,
            cache_ttl_ms: 300_000,
            limiter: LimiterConfig::default(),
            breaker: BreakerConfig::default(),
            retry: RetryConfig::network(),
        }
    }
}

// == Fetch Pipeline ==
/// One source's resilience stack: cache, limiter, breaker, and retry policy,
/// injected at construction and owned explicitly (never a global).
///
/// Cheap to clone; clones share all underlying state.
#[derive(Debug, Clone)]
pub struct FetchPipeline<V> {
    name: Arc<String>,
    cache: Arc<RwLock<TtlCache<V>>>,
    limiter: AdaptiveRateLimiter,
    breaker: CircuitBreaker,
    retry: RetryConfig,
    retries: Arc<RetryManager>,
}

impl<V: Clone> FetchPipeline<V> {
    // == Constructor ==
    /// Builds the full stack for one named source.
    ///
    /// All component configurations are validated here; a bad threshold or
    /// rate is a construction-time error, never a runtime surprise.
    pub fn new(name: impl Into<String>, config: PipelineConfig) -> Result<Self> {
        Self::with_retry_manager(name, config, Arc::new(RetryManager::new()))
    }

    /// Like [`FetchPipeline::new`], with a shared retry manager so several
    /// sources report statistics into one place.
    pub fn with_retry_manager(
        name: impl Into<String>,
        config: PipelineConfig,
        retries: Arc<RetryManager>,
    ) -> Result<Self> {
        let name = name.into();
        config.retry.validate()?;

        Ok(Self {
            cache: Arc::new(RwLock::new(TtlCache::new(
                config.cache_max_entries,
                config.cache_ttl_ms,
            )?)),
            limiter: AdaptiveRateLimiter::new(config.limiter)?,
            breaker: CircuitBreaker::new(name.clone(), config.breaker)?,
            retry: config.retry,
            retries,
            name: Arc::new(name),
        })
    }

    /// The source this pipeline serves.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Fetch ==
    /// Runs one logical request through the whole stack.
    ///
    /// A cache hit returns immediately without touching limiter, breaker, or
    /// upstream. Otherwise the caller suspends for admission, then the
    /// breaker gates a retry sequence around `operation`; the sequence's
    /// terminal outcome drives the limiter's success/error accounting and,
    /// on success, is written back to the cache under `key`.
    pub async fn fetch<F, Fut>(&self, key: &str, mut operation: F) -> Result<V>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        if let Some(value) = self.cache.write().await.get(key) {
            debug!(source = %self.name, key, "Cache hit");
            return Ok(value);
        }

        self.limiter.wait_for_limit().await;

        let retries = self.retries.clone();
        let retry_config = self.retry.clone();
        let name = self.name.clone();
        let gated = self
            .breaker
            .execute(move || async move {
                retries
                    .run(&name, &mut operation, &retry_config)
                    .await
                    .result
            })
            .await;

        match gated {
            Ok(value) => {
                self.limiter.record_success().await;
                self.cache
                    .write()
                    .await
                    .set(key.to_string(), value.clone(), None)?;
                Ok(value)
            }
            Err(BreakerError::Open { name, retry_in_ms }) => {
                // Fast-fail: the upstream was never called, so the limiter
                // has nothing to account for
                Err(ResilienceError::CircuitOpen { name, retry_in_ms })
            }
            Err(BreakerError::Operation(err)) => {
                self.limiter.record_error().await;
                Err(ResilienceError::Upstream(format!("{:#}", err)))
            }
        }
    }

    // == Component Access ==
    /// The limiter, for manual rate control and stats.
    pub fn limiter(&self) -> &AdaptiveRateLimiter {
        &self.limiter
    }

    /// The circuit breaker, for resets and stats.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// The shared retry manager.
    pub fn retries(&self) -> &RetryManager {
        &self.retries
    }

    // == Cache Maintenance ==
    /// Snapshot of the cache counters.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Drops every cached value for this source.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// Removes expired cache entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        self.cache.write().await.purge_expired()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::CircuitState;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_pipeline(name: &str) -> FetchPipeline<String> {
        FetchPipeline::new(
            name,
            PipelineConfig {
                cache_max_entries: 10,
                cache_ttl_ms: 60_000,
                limiter: LimiterConfig {
                    initial_rate: 50,
                    min_rate: 1,
                    max_rate: 100,
                    window_ms: 1_000,
                    ..LimiterConfig::default()
                },
                breaker: BreakerConfig {
                    failure_threshold: 3,
                    reset_timeout_ms: 60,
                },
                retry: RetryConfig {
                    max_attempts: 2,
                    initial_delay_ms: 5,
                    max_delay_ms: 10,
                    factor: 2.0,
                    jitter: false,
                },
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_caches_and_short_circuits() {
        let pipeline = fast_pipeline("fierce");
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value = pipeline
                .fetch("articles:latest", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok("payload".to_string()) }
                })
                .await
                .unwrap();
            assert_eq!(value, "payload");
        }

        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "Only the first fetch should reach the upstream"
        );

        let stats = pipeline.cache_stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_surfaces_upstream_error() {
        let pipeline = fast_pipeline("edgar");
        let calls = AtomicU32::new(0);

        let result = pipeline
            .fetch("filing:10k", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<String, _>(anyhow::anyhow!("connection reset")) }
            })
            .await;

        assert!(matches!(result, Err(ResilienceError::Upstream(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2, "Both attempts should run");
    }

    #[tokio::test]
    async fn test_exhausted_retries_count_once_against_breaker() {
        let pipeline = fast_pipeline("registry");

        // Threshold 3: three exhausted retry sequences open the circuit
        for _ in 0..3 {
            let _ = pipeline
                .fetch("trial:NCT123", || async {
                    Err::<String, _>(anyhow::anyhow!("503"))
                })
                .await;
        }
        assert_eq!(pipeline.breaker().state().await, CircuitState::Open);

        // Fast-fail is distinguishable from an upstream failure
        let result = pipeline
            .fetch("trial:NCT123", || async { Ok("fine".to_string()) })
            .await;
        assert!(matches!(result, Err(ResilienceError::CircuitOpen { .. })));
    }

    #[tokio::test]
    async fn test_circuit_recovers_and_fetch_resumes() {
        let pipeline = fast_pipeline("press");

        for _ in 0..3 {
            let _ = pipeline
                .fetch("release:1", || async {
                    Err::<String, _>(anyhow::anyhow!("down"))
                })
                .await;
        }
        assert_eq!(pipeline.breaker().state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(90)).await;

        let value = pipeline
            .fetch("release:1", || async { Ok("recovered".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "recovered");
        assert_eq!(pipeline.breaker().state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_terminal_outcomes_drive_limiter_accounting() {
        let pipeline = fast_pipeline("fda");

        pipeline
            .fetch("approval:1", || async { Ok("ok".to_string()) })
            .await
            .unwrap();
        let _ = pipeline
            .fetch("approval:2", || async {
                Err::<String, _>(anyhow::anyhow!("bad gateway"))
            })
            .await;

        let stats = pipeline.limiter().stats().await;
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.error_count, 1);
    }

    #[tokio::test]
    async fn test_retry_stats_recorded_under_source_name() {
        let pipeline = fast_pipeline("fierce");

        let _ = pipeline
            .fetch("a", || async { Err::<String, _>(anyhow::anyhow!("x")) })
            .await;

        let stats = pipeline.retries().stats("fierce").await.unwrap();
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.failed_retries, 1);
    }
}
