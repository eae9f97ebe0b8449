//! Retry Module
//!
//! Exponential backoff retry for fallible async operations, with jitter,
//! retry predicates, an overall deadline variant, and per-operation
//! statistics tracking.

mod backoff;
mod config;
mod exec;
mod manager;

// Re-export public types
pub use backoff::backoff_delay_ms;
pub use config::RetryConfig;
pub use exec::{retry_with_backoff, retry_with_condition, retry_with_timeout, RetryOutcome};
pub use manager::{RetryManager, RetryStats};
