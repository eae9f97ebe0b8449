//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for pinning a source's request rate (PUT /sources/{name}/rate)
///
/// # Fields
/// - `rate`: The new rate in requests per window; clamped into the source's
///   configured bounds on apply
#[derive(Debug, Clone, Deserialize)]
pub struct SetRateRequest {
    /// Requests per window
    pub rate: u32,
}

impl SetRateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.rate == 0 {
            return Some("Rate must be at least 1".to_string());
        }
        None
    }
}
