//! Backstop - Resilience toolkit for web scrapers
//!
//! Four collaborating primitives keep scraper clients alive against an
//! unreliable, rate-limited upstream web: a TTL-LRU cache, an exponential
//! backoff retry, an adaptive rate limiter, and a per-resource circuit
//! breaker. [`pipeline::FetchPipeline`] composes them around an opaque
//! fetch+parse step, and [`registry::SourceRegistry`] owns one pipeline per
//! named source.

pub mod api;
pub mod breaker;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod pipeline;
pub mod registry;
pub mod retry;
pub mod tasks;

pub use api::AppState;
pub use breaker::{BreakerConfig, BreakerError, CircuitBreaker, CircuitState};
pub use cache::TtlCache;
pub use config::Config;
pub use error::{ResilienceError, Result};
pub use limiter::{AdaptiveRateLimiter, LimiterConfig, TokenBucket};
pub use pipeline::{FetchPipeline, PipelineConfig};
pub use registry::SourceRegistry;
pub use retry::{retry_with_backoff, RetryConfig, RetryManager};
pub use tasks::spawn_cleanup_task;
