//! Circuit Breaker Engine
//!
//! The state machine and its sole entry point, `execute`.
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count reaches failure_threshold
//! Open → HalfOpen: first call after reset_timeout_ms elapses
//! HalfOpen → Closed: the trial call succeeds
//! HalfOpen → Open: the trial call fails (timeout restarts)
//! ```
//!
//! Exactly one trial is in flight during HalfOpen; concurrent callers fail
//! fast until the trial settles.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::breaker::{BreakerConfig, BreakerStats, CircuitState};
use crate::clock::now_ms;
use crate::error::Result;

// == Breaker Error ==
/// Error surface of [`CircuitBreaker::execute`].
///
/// The fast-fail variant is distinct from an operation failure so callers
/// can tell "upstream is down, we didn't even try" from "this call failed".
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The circuit is open; the operation was not invoked
    #[error("Circuit '{name}' is open, retry in {retry_in_ms}ms")]
    Open { name: String, retry_in_ms: u64 },

    /// The operation ran and failed
    #[error("Operation failed: {0}")]
    Operation(E),
}

// == Admission ==
/// What the state machine decided for one incoming call.
enum Admission {
    /// Call passes through; `trial` marks the HalfOpen probe
    Proceed { trial: bool },
    /// Call fails fast without touching the upstream
    FastFail { retry_in_ms: u64 },
}

// == Breaker Core ==
/// Mutable state, guarded by the instance lock.
#[derive(Debug)]
struct BreakerCore {
    state: CircuitState,
    failure_count: u32,
    last_failure_at: Option<u64>,
    /// True while a HalfOpen probe is in flight
    trial_in_flight: bool,
}

// == Circuit Breaker ==
/// Per-resource circuit breaker.
///
/// Cheap to clone; clones share the same circuit. One instance guards one
/// named upstream for the process lifetime.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    name: Arc<String>,
    config: Arc<BreakerConfig>,
    core: Arc<Mutex<BreakerCore>>,
}

impl CircuitBreaker {
    // == Constructor ==
    /// Creates a closed circuit for the named resource.
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            name: Arc::new(name.into()),
            config: Arc::new(config),
            core: Arc::new(Mutex::new(BreakerCore {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure_at: None,
                trial_in_flight: false,
            })),
        })
    }

    /// The resource this circuit guards.
    pub fn name(&self) -> &str {
        &self.name
    }

    // == Execute ==
    /// Runs `operation` through the circuit.
    ///
    /// Closed admits the call; Open fails fast until the reset timeout
    /// elapses, then admits a single HalfOpen trial. The lock is held only
    /// around the state decisions, never across the operation itself.
    pub async fn execute<T, E, F, Fut>(
        &self,
        operation: F,
    ) -> std::result::Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let admission = self.admit().await;

        let trial = match admission {
            Admission::FastFail { retry_in_ms } => {
                return Err(BreakerError::Open {
                    name: self.name.to_string(),
                    retry_in_ms,
                });
            }
            Admission::Proceed { trial } => trial,
        };

        match operation().await {
            Ok(value) => {
                self.record_success(trial).await;
                Ok(value)
            }
            Err(err) => {
                self.record_failure(trial).await;
                Err(BreakerError::Operation(err))
            }
        }
    }

    // == Admission ==
    /// Applies the state machine to one incoming call.
    async fn admit(&self) -> Admission {
        let mut core = self.core.lock().await;

        match core.state {
            CircuitState::Closed => Admission::Proceed { trial: false },
            CircuitState::Open => {
                let opened_at = core.last_failure_at.unwrap_or(0);
                let elapsed = now_ms().saturating_sub(opened_at);
                if elapsed >= self.config.reset_timeout_ms {
                    info!(circuit = %self.name, "Reset timeout elapsed, probing upstream");
                    core.state = CircuitState::HalfOpen;
                    core.trial_in_flight = true;
                    Admission::Proceed { trial: true }
                } else {
                    Admission::FastFail {
                        retry_in_ms: self.config.reset_timeout_ms - elapsed,
                    }
                }
            }
            CircuitState::HalfOpen => {
                if core.trial_in_flight {
                    // A probe is already out; don't pile on the upstream
                    Admission::FastFail { retry_in_ms: 0 }
                } else {
                    core.trial_in_flight = true;
                    Admission::Proceed { trial: true }
                }
            }
        }
    }

    // == Record Success ==
    /// Applies a successful call to the state machine.
    async fn record_success(&self, trial: bool) {
        let mut core = self.core.lock().await;

        if trial {
            info!(circuit = %self.name, "Trial call succeeded, closing circuit");
            core.state = CircuitState::Closed;
            core.failure_count = 0;
            core.trial_in_flight = false;
        } else if core.state == CircuitState::Closed {
            core.failure_count = 0;
        }
        // A late success from a call admitted before the circuit opened
        // carries no signal about the current upstream; ignore it.
    }

    // == Record Failure ==
    /// Applies a failed call to the state machine.
    async fn record_failure(&self, trial: bool) {
        let mut core = self.core.lock().await;
        let now = now_ms();

        if trial {
            warn!(circuit = %self.name, "Trial call failed, reopening circuit");
            core.state = CircuitState::Open;
            core.last_failure_at = Some(now);
            core.trial_in_flight = false;
        } else if core.state == CircuitState::Closed {
            core.failure_count += 1;
            core.last_failure_at = Some(now);
            if core.failure_count >= self.config.failure_threshold {
                warn!(
                    circuit = %self.name,
                    failures = core.failure_count,
                    "Failure threshold reached, opening circuit"
                );
                core.state = CircuitState::Open;
            }
        }
        // Late failures while the circuit is already open change nothing.
    }

    // == State ==
    /// Returns the current circuit state.
    pub async fn state(&self) -> CircuitState {
        self.core.lock().await.state
    }

    // == Reset ==
    /// Forces the circuit closed with zeroed counters. Operator escape
    /// hatch; exposed on the admin API.
    pub async fn reset(&self) {
        let mut core = self.core.lock().await;
        info!(circuit = %self.name, "Circuit reset by operator");
        core.state = CircuitState::Closed;
        core.failure_count = 0;
        core.last_failure_at = None;
        core.trial_in_flight = false;
    }

    // == Stats ==
    /// Returns an observability snapshot without mutating state.
    pub async fn stats(&self) -> BreakerStats {
        let core = self.core.lock().await;
        BreakerStats {
            state: core.state,
            failure_count: core.failure_count,
            last_failure_at: core.last_failure_at,
        }
    }
}
