//! Retry Manager Module
//!
//! Wraps the retry loop with per-operation-name statistics. Purely
//! observational: it never changes how a retry sequence behaves.

use std::collections::HashMap;
use std::future::Future;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::retry::{retry_with_backoff, RetryConfig, RetryOutcome};

// == Retry Stats ==
/// Accumulated retry counters for one named operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetryStats {
    /// Attempts made across all sequences
    pub total_attempts: u64,
    /// Sequences that succeeded after more than one attempt
    pub successful_retries: u64,
    /// Sequences that exhausted every attempt
    pub failed_retries: u64,
    /// Total milliseconds spent sleeping between attempts
    pub total_delay_ms: u64,
}

// == Retry Manager ==
/// Tracks retry statistics per operation name for the process lifetime.
#[derive(Debug, Default)]
pub struct RetryManager {
    stats: RwLock<HashMap<String, RetryStats>>,
}

impl RetryManager {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Run ==
    /// Runs `operation` under `config`, recording the outcome against `name`.
    pub async fn run<T, E, F, Fut>(
        &self,
        name: &str,
        operation: F,
        config: &RetryConfig,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let outcome = retry_with_backoff(operation, config).await;

        let mut stats = self.stats.write().await;
        let entry = stats.entry(name.to_string()).or_default();
        entry.total_attempts += outcome.attempts as u64;
        entry.total_delay_ms += outcome.total_delay_ms;

        if outcome.is_success() {
            if outcome.attempts > 1 {
                entry.successful_retries += 1;
            }
        } else {
            entry.failed_retries += 1;
            warn!(
                operation = name,
                attempts = outcome.attempts,
                "Retries exhausted"
            );
        }

        outcome
    }

    // == Stats ==
    /// Returns the counters for one operation, if any sequence ran.
    pub async fn stats(&self, name: &str) -> Option<RetryStats> {
        self.stats.read().await.get(name).cloned()
    }

    /// Returns a snapshot of every tracked operation.
    pub async fn all_stats(&self) -> HashMap<String, RetryStats> {
        self.stats.read().await.clone()
    }

    // == Reset ==
    /// Clears the counters for one operation.
    pub async fn reset(&self, name: &str) {
        self.stats.write().await.remove(name);
    }

    /// Clears every counter.
    pub async fn reset_all(&self) {
        self.stats.write().await.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay_ms: 5,
            max_delay_ms: 20,
            factor: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn test_first_try_success_is_not_a_retry() {
        let manager = RetryManager::new();

        let outcome = manager
            .run("edgar", || async { Ok::<_, String>(1u32) }, &fast_config(3))
            .await;
        assert!(outcome.is_success());

        let stats = manager.stats("edgar").await.unwrap();
        assert_eq!(stats.total_attempts, 1);
        assert_eq!(stats.successful_retries, 0);
        assert_eq!(stats.failed_retries, 0);
    }

    #[tokio::test]
    async fn test_recovery_counts_as_successful_retry() {
        let manager = RetryManager::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let outcome = manager
            .run(
                "fierce",
                move || {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n == 0 {
                            Err("cold start".to_string())
                        } else {
                            Ok(n)
                        }
                    }
                },
                &fast_config(3),
            )
            .await;
        assert!(outcome.is_success());

        let stats = manager.stats("fierce").await.unwrap();
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.successful_retries, 1);
        assert_eq!(stats.failed_retries, 0);
        assert!(stats.total_delay_ms >= 5);
    }

    #[tokio::test]
    async fn test_exhaustion_counts_as_failed_retry() {
        let manager = RetryManager::new();

        let outcome: RetryOutcome<u32, String> = manager
            .run(
                "registry",
                || async { Err("down".to_string()) },
                &fast_config(2),
            )
            .await;
        assert!(!outcome.is_success());

        let stats = manager.stats("registry").await.unwrap();
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.failed_retries, 1);
        assert_eq!(stats.successful_retries, 0);
    }

    #[tokio::test]
    async fn test_stats_accumulate_per_name() {
        let manager = RetryManager::new();

        for _ in 0..3 {
            let _ = manager
                .run("edgar", || async { Ok::<_, String>(()) }, &fast_config(3))
                .await;
        }

        let stats = manager.stats("edgar").await.unwrap();
        assert_eq!(stats.total_attempts, 3);
        assert!(manager.stats("other").await.is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_counters() {
        let manager = RetryManager::new();

        let _ = manager
            .run("edgar", || async { Ok::<_, String>(()) }, &fast_config(3))
            .await;
        manager.reset("edgar").await;

        assert!(manager.stats("edgar").await.is_none());
    }
}
