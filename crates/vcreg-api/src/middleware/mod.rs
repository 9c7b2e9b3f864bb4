//! # HTTP Middleware
//!
//! - `metrics`: atomic request/error counters.
//! - `tracing_layer`: `tower_http` request spans.

pub mod metrics;
pub mod tracing_layer;
