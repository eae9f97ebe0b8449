//! Request and Response models for the admin API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::SetRateRequest;
pub use responses::{HealthResponse, RateResponse, ResetResponse, RetryStatsResponse, SourceListResponse};
