//! Rate Limiter Module
//!
//! Admission control for outbound scraping. The primary limiter uses a
//! sliding window whose allowed rate adapts to the observed error ratio; a
//! token-bucket variant exists for callers wanting smooth consumption
//! instead of windowed admission.

mod config;
mod sliding_window;
mod token_bucket;

// Re-export public types
pub use config::LimiterConfig;
pub use sliding_window::{AdaptiveRateLimiter, LimitDecision, LimiterStats};
pub use token_bucket::{TokenBucket, TokenBucketStats};
