//! Backoff Delay Module
//!
//! Computes the jittered exponential delay between retry attempts.

use rand::Rng;

use crate::retry::RetryConfig;

// == Backoff Delay ==
/// Delay in milliseconds after failed attempt `attempt` (0-indexed).
///
/// The deterministic delay is `initial_delay_ms * factor^attempt`, capped at
/// `max_delay_ms`. With jitter enabled the result is scaled by a uniform
/// draw from [0.5, 1.0), which decorrelates retries across many callers
/// hammering the same upstream.
pub fn backoff_delay_ms(attempt: u32, config: &RetryConfig) -> u64 {
    let exponential = config.initial_delay_ms as f64 * config.factor.powi(attempt as i32);
    let capped = exponential.min(config.max_delay_ms as f64);

    if config.jitter {
        let scale = rand::thread_rng().gen_range(0.5..1.0);
        (capped * scale) as u64
    } else {
        capped as u64
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn no_jitter() -> RetryConfig {
        RetryConfig {
            max_attempts: 10,
            initial_delay_ms: 1_000,
            max_delay_ms: 10_000,
            factor: 2.0,
            jitter: false,
        }
    }

    #[test]
    fn test_deterministic_delay_sequence() {
        let config = no_jitter();
        let delays: Vec<u64> = (0..6).map(|i| backoff_delay_ms(i, &config)).collect();

        assert_eq!(delays, vec![1_000, 2_000, 4_000, 8_000, 10_000, 10_000]);
    }

    #[test]
    fn test_jitter_stays_within_half_to_full_delay() {
        let config = RetryConfig {
            jitter: true,
            ..no_jitter()
        };

        for attempt in 0..6 {
            let deterministic = backoff_delay_ms(attempt, &no_jitter());
            let jittered = backoff_delay_ms(attempt, &config);
            assert!(jittered >= deterministic / 2, "Jitter below half the delay");
            assert!(jittered <= deterministic, "Jitter above the full delay");
        }
    }

    #[test]
    fn test_cap_applies_to_late_attempts() {
        let config = no_jitter();
        assert_eq!(backoff_delay_ms(30, &config), 10_000);
    }

    proptest! {
        // The cap holds for any attempt number and any sane parameters.
        #[test]
        fn prop_delay_never_exceeds_cap(
            attempt in 0u32..64,
            initial in 1u64..5_000,
            max in 5_000u64..120_000,
        ) {
            let config = RetryConfig {
                max_attempts: 10,
                initial_delay_ms: initial,
                max_delay_ms: max,
                factor: 2.0,
                jitter: false,
            };
            prop_assert!(backoff_delay_ms(attempt, &config) <= max);
        }

        // Without jitter, delays never shrink as attempts grow.
        #[test]
        fn prop_delay_is_monotonic(attempt in 0u32..32) {
            let config = RetryConfig {
                max_attempts: 10,
                initial_delay_ms: 100,
                max_delay_ms: 30_000,
                factor: 1.5,
                jitter: false,
            };
            prop_assert!(backoff_delay_ms(attempt + 1, &config) >= backoff_delay_ms(attempt, &config));
        }
    }
}
