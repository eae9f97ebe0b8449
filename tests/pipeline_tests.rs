//! Integration Tests for the Fetch Pipeline
//!
//! Exercises the composed stack the way a scraper client uses it: cache
//! short-circuit, rate-limited admission, circuit breaking, retries, and
//! recovery, including many in-flight requests sharing one pipeline.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backstop::{
    BreakerConfig, CircuitState, FetchPipeline, LimiterConfig, PipelineConfig, ResilienceError,
    RetryConfig,
};

// == Helper Functions ==

fn test_config() -> PipelineConfig {
    PipelineConfig {
        cache_max_entries: 50,
        cache_ttl_ms: 60_000,
        limiter: LimiterConfig {
            initial_rate: 100,
            min_rate: 1,
            max_rate: 200,
            window_ms: 1_000,
            ..LimiterConfig::default()
        },
        breaker: BreakerConfig {
            failure_threshold: 3,
            reset_timeout_ms: 80,
        },
        retry: RetryConfig {
            max_attempts: 2,
            initial_delay_ms: 5,
            max_delay_ms: 10,
            factor: 2.0,
            jitter: false,
        },
    }
}

// == Composition Tests ==

#[tokio::test]
async fn test_degraded_upstream_opens_then_recovers() {
    let pipeline: FetchPipeline<String> = FetchPipeline::new("edgar", test_config()).unwrap();
    let calls = Arc::new(AtomicU32::new(0));

    // Three exhausted retry sequences (2 attempts each) open the circuit
    for _ in 0..3 {
        let counter = calls.clone();
        let result = pipeline
            .fetch("filing:latest", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(anyhow::anyhow!("502 Bad Gateway")) }
            })
            .await;
        assert!(matches!(result, Err(ResilienceError::Upstream(_))));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 6);
    assert_eq!(pipeline.breaker().state().await, CircuitState::Open);

    // While open, fetches fail fast without touching the upstream
    let counter = calls.clone();
    let result = pipeline
        .fetch("filing:latest", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok("should not run".to_string()) }
        })
        .await;
    assert!(matches!(result, Err(ResilienceError::CircuitOpen { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 6, "Upstream must not be called");

    // After the reset timeout, the trial succeeds, closes the circuit, and
    // the value lands in the cache
    tokio::time::sleep(Duration::from_millis(120)).await;
    let value = pipeline
        .fetch("filing:latest", || async { Ok("10-K".to_string()) })
        .await
        .unwrap();
    assert_eq!(value, "10-K");
    assert_eq!(pipeline.breaker().state().await, CircuitState::Closed);

    // Subsequent fetches are cache hits; the closure never runs
    let counter = calls.clone();
    let cached = pipeline
        .fetch("filing:latest", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok("unreachable".to_string()) }
        })
        .await
        .unwrap();
    assert_eq!(cached, "10-K");
    assert_eq!(calls.load(Ordering::SeqCst), 7);
}

#[tokio::test]
async fn test_transient_failure_recovers_within_one_fetch() {
    let pipeline: FetchPipeline<String> = FetchPipeline::new("fierce", test_config()).unwrap();
    let calls = Arc::new(AtomicU32::new(0));

    let counter = calls.clone();
    let value = pipeline
        .fetch("news:today", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(anyhow::anyhow!("connection reset"))
                } else {
                    Ok("headline".to_string())
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "headline");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // The retry recovered, so the circuit never saw a failure
    let stats = pipeline.breaker().stats().await;
    assert_eq!(stats.state, CircuitState::Closed);
    assert_eq!(stats.failure_count, 0);

    // And the manager counted it as a successful retry
    let retry = pipeline.retries().stats("fierce").await.unwrap();
    assert_eq!(retry.successful_retries, 1);
}

#[tokio::test]
async fn test_sliding_window_throttles_burst() {
    let pipeline: FetchPipeline<String> = FetchPipeline::new(
        "registry",
        PipelineConfig {
            limiter: LimiterConfig {
                initial_rate: 3,
                min_rate: 1,
                max_rate: 10,
                window_ms: 300,
                ..LimiterConfig::default()
            },
            ..test_config()
        },
    )
    .unwrap();

    // Four distinct keys so the cache cannot short-circuit; the fourth
    // admission must wait out the window
    let started = std::time::Instant::now();
    for i in 0..4 {
        pipeline
            .fetch(&format!("trial:{}", i), || async { Ok("record".to_string()) })
            .await
            .unwrap();
    }

    assert!(
        started.elapsed() >= Duration::from_millis(250),
        "Burst beyond the window rate should have been throttled"
    );
}

#[tokio::test]
async fn test_cache_hits_bypass_rate_limiting() {
    let pipeline: FetchPipeline<String> = FetchPipeline::new(
        "press",
        PipelineConfig {
            limiter: LimiterConfig {
                initial_rate: 1,
                min_rate: 1,
                max_rate: 10,
                window_ms: 10_000,
                ..LimiterConfig::default()
            },
            ..test_config()
        },
    )
    .unwrap();

    pipeline
        .fetch("release:1", || async { Ok("body".to_string()) })
        .await
        .unwrap();

    // Rate is exhausted for 10s, but cache hits never consult the limiter
    let started = std::time::Instant::now();
    for _ in 0..5 {
        pipeline
            .fetch("release:1", || async { Ok("unreachable".to_string()) })
            .await
            .unwrap();
    }
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_concurrent_callers_share_one_pipeline() {
    let pipeline: Arc<FetchPipeline<String>> =
        Arc::new(FetchPipeline::new("edgar", test_config()).unwrap());
    let calls = Arc::new(AtomicU32::new(0));

    let mut handles = Vec::new();
    for i in 0..10 {
        let pipeline = pipeline.clone();
        let counter = calls.clone();
        handles.push(tokio::spawn(async move {
            pipeline
                .fetch(&format!("filing:{}", i % 2), move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok("doc".to_string()) }
                })
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    // Every caller saw a value; each got it either from its own fetch or
    // from the cache once another caller had populated it
    let stats = pipeline.cache_stats().await;
    assert_eq!(stats.hits + stats.misses, 10);
    assert!(calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_fetch_failures_leave_cache_unpopulated() {
    let pipeline: FetchPipeline<String> = FetchPipeline::new("fda", test_config()).unwrap();

    let _ = pipeline
        .fetch("approval:1", || async {
            Err(anyhow::anyhow!("parse error"))
        })
        .await;

    let stats = pipeline.cache_stats().await;
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.misses, 1);
}
