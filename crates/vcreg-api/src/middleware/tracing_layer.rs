//! # Request/Response Tracing
//!
//! Wraps `tower_http::trace::TraceLayer` so every request gets a span with
//! method, URI, and status code.

/// Build the `TraceLayer` used by the registry API.
pub fn layer() -> tower_http::trace::TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
> {
    tower_http::trace::TraceLayer::new_for_http()
}
