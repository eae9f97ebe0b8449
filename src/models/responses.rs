//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies. Per-source stats
//! responses serialize the registry's [`SourceStats`](crate::registry::SourceStats)
//! snapshot directly.

use std::collections::HashMap;

use serde::Serialize;

use crate::retry::RetryStats;

/// Response body for the source list endpoint (GET /sources)
#[derive(Debug, Clone, Serialize)]
pub struct SourceListResponse {
    /// Registered source names, sorted
    pub sources: Vec<String>,
    /// Number of registered sources
    pub count: usize,
}

impl SourceListResponse {
    /// Creates a new SourceListResponse
    pub fn new(sources: Vec<String>) -> Self {
        let count = sources.len();
        Self { sources, count }
    }
}

/// Response body for the reset endpoint (POST /sources/{name}/reset)
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    /// Success message
    pub message: String,
    /// The source that was reset
    pub source: String,
}

impl ResetResponse {
    /// Creates a new ResetResponse
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            message: format!("Source '{}' reset successfully", source),
            source,
        }
    }
}

/// Response body for the rate endpoint (PUT /sources/{name}/rate)
#[derive(Debug, Clone, Serialize)]
pub struct RateResponse {
    /// Success message
    pub message: String,
    /// The source whose rate was set
    pub source: String,
    /// The rate that was requested
    pub rate: u32,
}

impl RateResponse {
    /// Creates a new RateResponse
    pub fn new(source: impl Into<String>, rate: u32) -> Self {
        let source = source.into();
        Self {
            message: format!("Rate for '{}' set to {}", source, rate),
            source,
            rate,
        }
    }
}

/// Response body for the retry stats endpoint (GET /stats/retry)
#[derive(Debug, Clone, Serialize)]
pub struct RetryStatsResponse {
    /// Per-operation retry counters
    pub operations: HashMap<String, RetryStats>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a healthy response with the current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
