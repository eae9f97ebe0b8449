//! Circuit Breaker Module
//!
//! Per-resource failure tracking that fast-fails calls to a degraded
//! upstream, giving it room to recover instead of hammering it.

mod engine;
mod state;

// Re-export public types
pub use engine::{BreakerError, CircuitBreaker};
pub use state::{BreakerConfig, BreakerStats, CircuitState};
