//! Limiter Configuration Module
//!
//! Parameters for the adaptive sliding-window rate limiter.

use serde::Serialize;

use crate::error::{ResilienceError, Result};

// == Limiter Config ==
/// Sliding-window limiter parameters.
///
/// Rates are requests per window. Adaptation only ever moves `current_rate`
/// inside [`min_rate`, `max_rate`].
#[derive(Debug, Clone, Serialize)]
pub struct LimiterConfig {
    /// Rate the limiter starts at
    pub initial_rate: u32,
    /// Floor the rate never adapts below
    pub min_rate: u32,
    /// Ceiling the rate never adapts above
    pub max_rate: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Minimum time between rate adaptations, in milliseconds
    pub adaptation_interval_ms: u64,
    /// Error ratio above which the rate is cut
    pub adaptive_threshold: f64,
    /// Multiplier applied when cutting the rate
    pub backoff_factor: f64,
    /// Multiplier applied when growing the rate
    pub recovery_factor: f64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            initial_rate: 10,
            min_rate: 2,
            max_rate: 30,
            window_ms: 60_000,
            adaptation_interval_ms: 60_000,
            adaptive_threshold: 0.1,
            backoff_factor: 0.5,
            recovery_factor: 1.2,
        }
    }
}

impl LimiterConfig {
    // == Validate ==
    /// Rejects rate bounds and factors that would make admission or
    /// adaptation nonsensical.
    pub fn validate(&self) -> Result<()> {
        if self.min_rate == 0 {
            return Err(ResilienceError::InvalidConfig(
                "limiter min_rate must be at least 1".to_string(),
            ));
        }
        if self.min_rate > self.max_rate {
            return Err(ResilienceError::InvalidConfig(format!(
                "limiter min_rate {} exceeds max_rate {}",
                self.min_rate, self.max_rate
            )));
        }
        if self.initial_rate < self.min_rate || self.initial_rate > self.max_rate {
            return Err(ResilienceError::InvalidConfig(format!(
                "limiter initial_rate {} outside [{}, {}]",
                self.initial_rate, self.min_rate, self.max_rate
            )));
        }
        if self.window_ms == 0 {
            return Err(ResilienceError::InvalidConfig(
                "limiter window_ms must be at least 1".to_string(),
            ));
        }
        if !(self.adaptive_threshold > 0.0 && self.adaptive_threshold < 1.0) {
            return Err(ResilienceError::InvalidConfig(format!(
                "limiter adaptive_threshold must be in (0, 1), got {}",
                self.adaptive_threshold
            )));
        }
        if !(self.backoff_factor > 0.0 && self.backoff_factor < 1.0) {
            return Err(ResilienceError::InvalidConfig(format!(
                "limiter backoff_factor must be in (0, 1), got {}",
                self.backoff_factor
            )));
        }
        if self.recovery_factor <= 1.0 {
            return Err(ResilienceError::InvalidConfig(format!(
                "limiter recovery_factor must exceed 1.0, got {}",
                self.recovery_factor
            )));
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        LimiterConfig::default().validate().unwrap();
    }

    #[test]
    fn test_zero_min_rate_rejected() {
        let config = LimiterConfig {
            min_rate: 0,
            ..LimiterConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ResilienceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_initial_rate_outside_bounds_rejected() {
        let config = LimiterConfig {
            initial_rate: 100,
            max_rate: 30,
            ..LimiterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = LimiterConfig {
            min_rate: 50,
            max_rate: 10,
            ..LimiterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_growth_factor_below_one_rejected() {
        let config = LimiterConfig {
            recovery_factor: 0.9,
            ..LimiterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_of_one_rejected() {
        let config = LimiterConfig {
            adaptive_threshold: 1.0,
            ..LimiterConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
