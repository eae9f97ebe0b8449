//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::config::Config;
use crate::error::{ResilienceError, Result};
use crate::models::{
    HealthResponse, RateResponse, ResetResponse, RetryStatsResponse, SetRateRequest,
    SourceListResponse,
};
use crate::pipeline::PipelineConfig;
use crate::registry::{SourceRegistry, SourceStats};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The frozen source registry
    pub registry: Arc<SourceRegistry>,
}

impl AppState {
    /// Creates a new AppState around an already-built registry.
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Builds the registry from configuration, one pipeline per source.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = SourceRegistry::new();
        for source in &config.sources {
            registry.register(
                source.clone(),
                PipelineConfig {
                    cache_max_entries: config.cache_max_entries,
                    cache_ttl_ms: config.cache_ttl_ms,
                    ..PipelineConfig::default()
                },
            )?;
        }
        Ok(Self::new(registry))
    }
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /sources
///
/// Lists the registered scraping sources.
pub async fn list_sources_handler(State(state): State<AppState>) -> Json<SourceListResponse> {
    Json(SourceListResponse::new(state.registry.names()))
}

/// Handler for GET /sources/:name/stats
///
/// Returns the combined breaker/limiter/cache/retry snapshot for one source.
pub async fn source_stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SourceStats>> {
    let stats = state.registry.stats(&name).await?;
    Ok(Json(stats))
}

/// Handler for POST /sources/:name/reset
///
/// Forces the source's circuit closed and its limiter back to the initial
/// rate. The operator escape hatch.
pub async fn reset_source_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ResetResponse>> {
    state.registry.reset(&name).await?;
    Ok(Json(ResetResponse::new(name)))
}

/// Handler for PUT /sources/:name/rate
///
/// Pins the source's request rate, clamped into its configured bounds.
pub async fn set_rate_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<SetRateRequest>,
) -> Result<Json<RateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ResilienceError::InvalidRequest(error_msg));
    }

    let pipeline = state
        .registry
        .get(&name)
        .ok_or_else(|| ResilienceError::UnknownSource(name.clone()))?;
    pipeline.limiter().set_rate(req.rate).await;

    Ok(Json(RateResponse::new(name, req.rate)))
}

/// Handler for GET /stats/retry
///
/// Returns retry counters for every operation that has run.
pub async fn retry_stats_handler(State(state): State<AppState>) -> Json<RetryStatsResponse> {
    let operations = state.registry.retries().all_stats().await;
    Json(RetryStatsResponse { operations })
}
