//! # vcreg-api: HTTP Service for the Identity & Credential Registry
//!
//! Exposes one [`vcreg_registry::Registry`] over HTTP. Every registry call
//! uses the bearer-token principal as caller and the server's
//! [`vcreg_registry::ChainClock`] as height.
//!
//! ## API Surface
//!
//! | Prefix | Module | Domain |
//! |--------|--------|--------|
//! | `/v1/identities/*` | [`routes::identity`] | Identities |
//! | `/v1/credentials/*` | [`routes::credentials`] | Credentials |
//! | `/v1/admin/*`, `/v1/status`, `/v1/chain/*` | [`routes::admin`] | Pause, status, clock |
//! | `/openapi.json` | [`openapi`] | OpenAPI document |
//! | `/health/*` | this module | Probes (unauthenticated) |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;

use crate::state::AppState;

/// Assemble the full application router.
///
/// Health probes are mounted outside the auth middleware so they remain
/// reachable without credentials.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::identity::router())
        .merge(routes::credentials::router())
        .merge(routes::admin::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(state.tokens.clone()))
        .layer(axum::Extension(state.metrics.clone()))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the router is serving.
async fn readiness() -> &'static str {
    "ready"
}
