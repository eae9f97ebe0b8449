//! Breaker State Module
//!
//! The circuit state machine's vocabulary: states, configuration, and the
//! observability snapshot.

use serde::Serialize;

use crate::error::{ResilienceError, Result};

// == Circuit State ==
/// The three circuit states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation, calls pass through
    Closed,
    /// Upstream assumed down, calls fail fast
    Open,
    /// One trial call probes whether the upstream recovered
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        };
        write!(f, "{}", label)
    }
}

// == Breaker Config ==
/// Circuit breaker parameters.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Time the circuit stays open before allowing a trial, in milliseconds
    pub reset_timeout_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_ms: 30_000,
        }
    }
}

impl BreakerConfig {
    // == Validate ==
    pub fn validate(&self) -> Result<()> {
        if self.failure_threshold == 0 {
            return Err(ResilienceError::InvalidConfig(
                "breaker failure_threshold must be at least 1".to_string(),
            ));
        }
        if self.reset_timeout_ms == 0 {
            return Err(ResilienceError::InvalidConfig(
                "breaker reset_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// == Breaker Stats ==
/// Observability snapshot of one circuit. Never mutates state.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerStats {
    /// Current circuit state
    pub state: CircuitState,
    /// Consecutive failures observed while closed
    pub failure_count: u32,
    /// When the circuit last recorded an opening failure (Unix milliseconds)
    pub last_failure_at: Option<u64>,
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        BreakerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = BreakerConfig {
            failure_threshold: 0,
            ..BreakerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ResilienceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = BreakerConfig {
            reset_timeout_ms: 0,
            ..BreakerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let json = serde_json::to_string(&CircuitState::HalfOpen).unwrap();
        assert_eq!(json, "\"half_open\"");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(CircuitState::Closed.to_string(), "closed");
        assert_eq!(CircuitState::Open.to_string(), "open");
        assert_eq!(CircuitState::HalfOpen.to_string(), "half_open");
    }
}
