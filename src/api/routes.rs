//! API Routes
//!
//! Configures the Axum router with all admin endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, list_sources_handler, reset_source_handler, retry_stats_handler,
    set_rate_handler, source_stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /sources` - List registered sources
/// - `GET /sources/:name/stats` - Combined stats for one source
/// - `POST /sources/:name/reset` - Force a source's circuit closed
/// - `PUT /sources/:name/rate` - Pin a source's request rate
/// - `GET /stats/retry` - Retry counters across all sources
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/health", get(health_handler))
        .route("/sources", get(list_sources_handler))
        .route("/sources/:name/stats", get(source_stats_handler))
        .route("/sources/:name/reset", post(reset_source_handler))
        .route("/sources/:name/rate", put(set_rate_handler))
        .route("/stats/retry", get(retry_stats_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
