//! Retry Configuration Module
//!
//! Defines retry parameters and the named presets scraper clients pick from.

use serde::Serialize;

use crate::error::{ResilienceError, Result};

// == Retry Config ==
/// Parameters for one retry sequence. Pure value, passed per call.
#[derive(Debug, Clone, Serialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each failed attempt
    pub factor: f64,
    /// Randomize each delay to decorrelate simultaneous retries
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::network()
    }
}

impl RetryConfig {
    // == Presets ==
    /// Flaky-network default: few attempts, quick escalation.
    pub fn network() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 10_000,
            factor: 2.0,
            jitter: true,
        }
    }

    /// Database contention: more attempts with gentler delays.
    pub fn database() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 200,
            max_delay_ms: 5_000,
            factor: 2.0,
            jitter: true,
        }
    }

    /// Upstream told us to slow down: long, widely spaced waits.
    pub fn rate_limited() -> Self {
        Self {
            max_attempts: 4,
            initial_delay_ms: 5_000,
            max_delay_ms: 60_000,
            factor: 2.0,
            jitter: true,
        }
    }

    /// Must-not-fail work: many attempts, generous ceiling.
    pub fn critical() -> Self {
        Self {
            max_attempts: 7,
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            factor: 2.0,
            jitter: true,
        }
    }

    // == Validate ==
    /// Rejects configurations that could never terminate sensibly.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ResilienceError::InvalidConfig(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(ResilienceError::InvalidConfig(format!(
                "retry initial_delay_ms {} exceeds max_delay_ms {}",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        if self.factor < 1.0 {
            return Err(ResilienceError::InvalidConfig(format!(
                "retry factor must be >= 1.0, got {}",
                self.factor
            )));
        }
        Ok(())
    }
}
