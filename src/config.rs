//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Admin server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Names of the scraping sources to register at startup
    pub sources: Vec<String>,
    /// Per-source cache capacity in entries
    pub cache_max_entries: usize,
    /// Per-source cache TTL in milliseconds
    pub cache_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cache sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SOURCES` - Comma-separated source names (default: "fierce,edgar,clinical_trials,press_releases")
    /// - `CACHE_MAX_ENTRIES` - Per-source cache capacity (default: 1000)
    /// - `CACHE_TTL_MS` - Per-source cache TTL in milliseconds (default: 300000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        Self {
            sources: env::var("SOURCES")
                .unwrap_or_else(|_| "fierce,edgar,clinical_trials,press_releases".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            cache_ttl_ms: env::var("CACHE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300_000),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![
                "fierce".to_string(),
                "edgar".to_string(),
                "clinical_trials".to_string(),
                "press_releases".to_string(),
            ],
            cache_max_entries: 1000,
            cache_ttl_ms: 300_000,
            server_port: 3000,
            cleanup_interval: 30,
        }
    }
}
