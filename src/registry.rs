//! Source Registry Module
//!
//! Explicitly owned per-source pipelines, keyed by source name. Built once
//! at startup and shared behind an `Arc`; there is no global mutable state
//! and nothing registers itself implicitly.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::breaker::BreakerStats;
use crate::cache::CacheStats;
use crate::error::{ResilienceError, Result};
use crate::limiter::LimiterStats;
use crate::pipeline::{FetchPipeline, PipelineConfig};
use crate::retry::{RetryManager, RetryStats};

// == Source Stats ==
/// Combined observability snapshot for one source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStats {
    /// Source name
    pub source: String,
    /// Circuit breaker snapshot
    pub breaker: BreakerStats,
    /// Rate limiter snapshot
    pub limiter: LimiterStats,
    /// Cache counters
    pub cache: CacheStats,
    /// Retry counters, absent until the first sequence runs
    pub retry: Option<RetryStats>,
}

// == Source Registry ==
/// All registered scraping sources and their resilience stacks.
///
/// Sources are registered during startup, then the registry is frozen
/// behind an `Arc` for the life of the process. Scraped documents are
/// cached as JSON values, which is what every parse step produces.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, FetchPipeline<Value>>,
    retries: Arc<RetryManager>,
}

impl SourceRegistry {
    // == Constructor ==
    /// Creates an empty registry with a shared retry manager.
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            retries: Arc::new(RetryManager::new()),
        }
    }

    // == Register ==
    /// Adds a source and builds its pipeline. Registering a name twice is a
    /// configuration error.
    pub fn register(&mut self, name: impl Into<String>, config: PipelineConfig) -> Result<()> {
        let name = name.into();
        if self.sources.contains_key(&name) {
            return Err(ResilienceError::InvalidConfig(format!(
                "source '{}' registered twice",
                name
            )));
        }

        let pipeline =
            FetchPipeline::with_retry_manager(name.clone(), config, self.retries.clone())?;
        info!(source = %name, "Registered scraping source");
        self.sources.insert(name, pipeline);
        Ok(())
    }

    // == Lookup ==
    /// Returns the pipeline for a source, if registered.
    pub fn get(&self, name: &str) -> Option<&FetchPipeline<Value>> {
        self.sources.get(name)
    }

    /// Registered source names, sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The retry manager shared by every source.
    pub fn retries(&self) -> &RetryManager {
        &self.retries
    }

    // == Stats ==
    /// Combined snapshot for one source.
    pub async fn stats(&self, name: &str) -> Result<SourceStats> {
        let pipeline = self
            .get(name)
            .ok_or_else(|| ResilienceError::UnknownSource(name.to_string()))?;

        Ok(SourceStats {
            source: name.to_string(),
            breaker: pipeline.breaker().stats().await,
            limiter: pipeline.limiter().stats().await,
            cache: pipeline.cache_stats().await,
            retry: self.retries.stats(name).await,
        })
    }

    // == Reset ==
    /// Operator escape hatch: forces the source's circuit closed and
    /// returns its limiter to the initial rate.
    pub async fn reset(&self, name: &str) -> Result<()> {
        let pipeline = self
            .get(name)
            .ok_or_else(|| ResilienceError::UnknownSource(name.to_string()))?;

        pipeline.breaker().reset().await;
        pipeline.limiter().reset().await;
        Ok(())
    }

    // == Cache Maintenance ==
    /// Purges expired cache entries across every source, returning the
    /// total number removed.
    pub async fn purge_expired(&self) -> usize {
        let mut removed = 0;
        for pipeline in self.sources.values() {
            removed += pipeline.purge_expired().await;
        }
        removed
    }
}
