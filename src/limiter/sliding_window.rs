//! Sliding Window Limiter Module
//!
//! Admission control over a sliding time window, with a rate that adapts to
//! the observed success/error ratio of the calls it admitted.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clock::now_ms;
use crate::error::Result;
use crate::limiter::LimiterConfig;

// == Limit Decision ==
/// Outcome of one admission check.
#[derive(Debug, Clone)]
pub struct LimitDecision {
    /// Whether the request was admitted
    pub allowed: bool,
    /// On rejection, time until the oldest timestamp leaves the window
    pub wait_time_ms: u64,
    /// Rate in force when the check ran
    pub current_rate: u32,
    /// Admitted requests currently inside the window
    pub request_count: usize,
}

// == Limiter Stats ==
/// Observability snapshot of a limiter instance.
#[derive(Debug, Clone, Serialize)]
pub struct LimiterStats {
    /// Rate currently in force (requests per window)
    pub current_rate: u32,
    /// Configured floor
    pub min_rate: u32,
    /// Configured ceiling
    pub max_rate: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Admitted requests currently inside the window
    pub request_count: usize,
    /// Successes recorded since the last adaptation
    pub success_count: u64,
    /// Errors recorded since the last adaptation
    pub error_count: u64,
}

// == Window State ==
/// Mutable limiter state, guarded by the instance lock.
#[derive(Debug)]
struct WindowState {
    current_rate: u32,
    /// Admission timestamps, oldest first, pruned to the window
    timestamps: VecDeque<u64>,
    success_count: u64,
    error_count: u64,
    last_adaptation_ms: u64,
}

// == Adaptive Rate Limiter ==
/// Sliding-window rate limiter with error-driven rate adaptation.
///
/// Cheap to clone; clones share the same window and counters. Rejection is
/// backpressure, not failure: callers wait out `wait_time_ms` and try again,
/// which [`AdaptiveRateLimiter::wait_for_limit`] does for them.
#[derive(Debug, Clone)]
pub struct AdaptiveRateLimiter {
    config: Arc<LimiterConfig>,
    state: Arc<Mutex<WindowState>>,
}

impl AdaptiveRateLimiter {
    // == Constructor ==
    /// Creates a limiter from a validated configuration.
    pub fn new(config: LimiterConfig) -> Result<Self> {
        config.validate()?;

        let state = WindowState {
            current_rate: config.initial_rate,
            timestamps: VecDeque::new(),
            success_count: 0,
            error_count: 0,
            last_adaptation_ms: now_ms(),
        };

        Ok(Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
        })
    }

    // == Check Limit ==
    /// Attempts to admit one request.
    ///
    /// Admission succeeds iff fewer than `current_rate` admissions remain in
    /// the window; the new timestamp is recorded on success. On rejection,
    /// `wait_time_ms` is how long until the oldest admission ages out.
    pub async fn check_limit(&self) -> LimitDecision {
        let mut state = self.state.lock().await;
        let now = now_ms();
        Self::prune_window(&mut state, self.config.window_ms, now);

        if state.timestamps.len() < state.current_rate as usize {
            state.timestamps.push_back(now);
            LimitDecision {
                allowed: true,
                wait_time_ms: 0,
                current_rate: state.current_rate,
                request_count: state.timestamps.len(),
            }
        } else {
            let oldest = *state.timestamps.front().expect("window is non-empty");
            let wait_time_ms = (oldest + self.config.window_ms).saturating_sub(now).max(1);
            LimitDecision {
                allowed: false,
                wait_time_ms,
                current_rate: state.current_rate,
                request_count: state.timestamps.len(),
            }
        }
    }

    // == Wait For Limit ==
    /// Suspends the caller until admission succeeds.
    ///
    /// An explicit loop, not recursion: each rejection is followed by a sleep
    /// for the reported wait time, so sustained contention never busy-spins
    /// or grows the stack.
    pub async fn wait_for_limit(&self) {
        loop {
            let decision = self.check_limit().await;
            if decision.allowed {
                return;
            }
            debug!(
                wait_ms = decision.wait_time_ms,
                in_window = decision.request_count,
                "Rate limited, waiting for admission"
            );
            tokio::time::sleep(Duration::from_millis(decision.wait_time_ms)).await;
        }
    }

    // == Record Success ==
    /// Records a successful upstream call and maybe adapts the rate.
    pub async fn record_success(&self) {
        let mut state = self.state.lock().await;
        state.success_count += 1;
        self.maybe_adapt(&mut state);
    }

    // == Record Error ==
    /// Records a failed upstream call and maybe adapts the rate.
    pub async fn record_error(&self) {
        let mut state = self.state.lock().await;
        state.error_count += 1;
        self.maybe_adapt(&mut state);
    }

    // == Set Rate ==
    /// Manually pins the rate, clamped into [min_rate, max_rate].
    pub async fn set_rate(&self, rate: u32) {
        let mut state = self.state.lock().await;
        let clamped = rate.clamp(self.config.min_rate, self.config.max_rate);
        info!(from = state.current_rate, to = clamped, "Rate set manually");
        state.current_rate = clamped;
    }

    // == Reset ==
    /// Returns the limiter to its initial rate with an empty window.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.current_rate = self.config.initial_rate;
        state.timestamps.clear();
        state.success_count = 0;
        state.error_count = 0;
        state.last_adaptation_ms = now_ms();
    }

    // == Stats ==
    /// Returns an observability snapshot. Prunes the window but otherwise
    /// does not mutate limiter behavior.
    pub async fn stats(&self) -> LimiterStats {
        let mut state = self.state.lock().await;
        Self::prune_window(&mut state, self.config.window_ms, now_ms());

        LimiterStats {
            current_rate: state.current_rate,
            min_rate: self.config.min_rate,
            max_rate: self.config.max_rate,
            window_ms: self.config.window_ms,
            request_count: state.timestamps.len(),
            success_count: state.success_count,
            error_count: state.error_count,
        }
    }

    // == Window Pruning ==
    /// Drops admission timestamps that have aged out of the window.
    fn prune_window(state: &mut WindowState, window_ms: u64, now: u64) {
        while let Some(&oldest) = state.timestamps.front() {
            if now.saturating_sub(oldest) >= window_ms {
                state.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    // == Rate Adaptation ==
    /// Adapts the rate from the observed error ratio.
    ///
    /// Runs at most once per adaptation interval. Error rate above the
    /// threshold cuts the rate; below half the threshold grows it; the dead
    /// zone in between leaves it alone so the rate cannot thrash. Counters
    /// restart after every decision, changed or not.
    fn maybe_adapt(&self, state: &mut WindowState) {
        let now = now_ms();
        if now.saturating_sub(state.last_adaptation_ms) < self.config.adaptation_interval_ms {
            return;
        }

        let total = state.success_count + state.error_count;
        if total == 0 {
            state.last_adaptation_ms = now;
            return;
        }

        let error_rate = state.error_count as f64 / total as f64;

        if error_rate > self.config.adaptive_threshold {
            let reduced = (state.current_rate as f64 * self.config.backoff_factor).floor() as u32;
            let new_rate = reduced.max(self.config.min_rate);
            if new_rate != state.current_rate {
                warn!(
                    error_rate = format!("{:.2}", error_rate),
                    from = state.current_rate,
                    to = new_rate,
                    "Error rate high, backing off request rate"
                );
                state.current_rate = new_rate;
            }
        } else if error_rate < self.config.adaptive_threshold / 2.0
            && state.current_rate < self.config.max_rate
        {
            let grown = (state.current_rate as f64 * self.config.recovery_factor).floor() as u32;
            let new_rate = grown.min(self.config.max_rate);
            if new_rate != state.current_rate {
                info!(
                    error_rate = format!("{:.2}", error_rate),
                    from = state.current_rate,
                    to = new_rate,
                    "Error rate low, recovering request rate"
                );
                state.current_rate = new_rate;
            }
        }

        state.success_count = 0;
        state.error_count = 0;
        state.last_adaptation_ms = now;
    }
}
