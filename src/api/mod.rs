//! API Module
//!
//! HTTP handlers and routing for the admin/observability REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /sources` - List registered sources
//! - `GET /sources/:name/stats` - Combined stats for one source
//! - `POST /sources/:name/reset` - Force a source's circuit closed
//! - `PUT /sources/:name/rate` - Pin a source's request rate
//! - `GET /stats/retry` - Retry counters across all sources

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
