//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: removes expired entries across all registered source caches

pub mod cleanup;

pub use cleanup::spawn_cleanup_task;
