//! Error types for the resilience toolkit
//!
//! Provides unified error handling using thiserror.
//!
//! A cache miss is deliberately absent from this enum: misses are normal
//! control flow and surface as `Option::None`, never as an error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Resilience Error Enum ==
/// Unified error type for the toolkit and its admin API.
#[derive(Error, Debug)]
pub enum ResilienceError {
    /// Circuit breaker is open; the upstream was not called
    #[error("Circuit '{name}' is open, retry in {retry_in_ms}ms")]
    CircuitOpen { name: String, retry_in_ms: u64 },

    /// The wrapped operation failed after retries were exhausted
    #[error("Upstream operation failed: {0}")]
    Upstream(String),

    /// A retry sequence exceeded its overall deadline
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid thresholds, rates, or bounds supplied at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Named source is not registered
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Invalid request data on the admin API
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ResilienceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ResilienceError::CircuitOpen { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ResilienceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ResilienceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ResilienceError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ResilienceError::UnknownSource(_) => StatusCode::NOT_FOUND,
            ResilienceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the toolkit.
pub type Result<T> = std::result::Result<T, ResilienceError>;
