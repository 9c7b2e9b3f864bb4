//! # Bearer Token Authentication
//!
//! Every request outside `/health/*` must carry `Authorization: Bearer <token>`.
//! The token is looked up in the configured [`TokenTable`] and the matching
//! principal is injected into the request extensions as a [`CallerIdentity`].
//! Handlers receive it through the `FromRequestParts` impl and use it as the
//! registry caller.
//!
//! ## Security Invariant
//!
//! Token lookup compares against every table entry in constant time and does
//! not stop at the first match, so response timing reveals neither which
//! entry matched nor how much of a token prefix was correct.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::{Choice, ConstantTimeEq};

use vcreg_core::Principal;

use crate::config::TokenGrant;
use crate::error::{AppError, ErrorBody, ErrorDetail};

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// The authenticated principal for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub principal: Principal,
}

/// Extracts the identity that [`auth_middleware`] injected.
///
/// Returns 401 if it is absent.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Token Table ─────────────────────────────────────────────────────────────

/// Token → principal table, shared across requests.
///
/// Custom `Debug` never prints tokens.
#[derive(Clone, Default)]
pub struct TokenTable {
    grants: Arc<Vec<TokenGrant>>,
}

impl std::fmt::Debug for TokenTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenTable")
            .field("entries", &self.grants.len())
            .finish()
    }
}

impl TokenTable {
    /// Build a table from config grants.
    pub fn new(grants: Vec<TokenGrant>) -> Self {
        Self {
            grants: Arc::new(grants),
        }
    }

    /// Number of configured tokens.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Whether no tokens are configured.
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Resolve a presented token to its principal.
    pub fn resolve(&self, provided: &str) -> Option<Principal> {
        let mut found: Option<&Principal> = None;
        for grant in self.grants.iter() {
            let matched: bool = constant_time_token_eq(provided, &grant.token).into();
            if matched && found.is_none() {
                found = Some(&grant.principal);
            }
        }
        found.cloned()
    }
}

/// Constant-time token comparison.
///
/// On a length mismatch a dummy comparison keeps the timing profile flat.
fn constant_time_token_eq(provided: &str, expected: &str) -> Choice {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return Choice::from(0);
    }
    provided.ct_eq(expected)
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the bearer token and inject the caller's [`CallerIdentity`].
///
/// Expects a [`TokenTable`] in the request extensions. With no table, or an
/// empty one, every request is rejected.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let table = request
        .extensions()
        .get::<TokenTable>()
        .cloned()
        .unwrap_or_default();

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) => match value.strip_prefix("Bearer ") {
            Some(provided) => match table.resolve(provided) {
                Some(principal) => {
                    tracing::debug!(principal = %principal, "request authenticated");
                    request
                        .extensions_mut()
                        .insert(CallerIdentity { principal });
                    next.run(request).await
                }
                None => {
                    tracing::warn!("authentication failed: unknown bearer token");
                    unauthorized_response("invalid bearer token")
                }
            },
            None => {
                tracing::warn!("authentication failed: non-Bearer authorization scheme");
                unauthorized_response("authorization header must use Bearer scheme")
            }
        },
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            details: None,
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn p(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    fn table() -> TokenTable {
        TokenTable::new(vec![
            TokenGrant {
                token: "alice-secret".into(),
                principal: p("alice"),
            },
            TokenGrant {
                token: "bob-secret".into(),
                principal: p("bob"),
            },
        ])
    }

    /// Minimal router that echoes the authenticated principal.
    fn test_app(table: TokenTable) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|caller: CallerIdentity| async move { caller.principal.to_string() }),
            )
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(table))
    }

    async fn call(app: Router, auth: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = auth {
            builder = builder.header("Authorization", value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    // ── Token table ──────────────────────────────────────────────

    #[test]
    fn resolve_maps_token_to_principal() {
        let t = table();
        assert_eq!(t.resolve("alice-secret"), Some(p("alice")));
        assert_eq!(t.resolve("bob-secret"), Some(p("bob")));
        assert_eq!(t.resolve("alice-secre"), None);
        assert_eq!(t.resolve(""), None);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(bool::from(constant_time_token_eq("abc", "abc")));
        assert!(!bool::from(constant_time_token_eq("abc", "abd")));
        assert!(!bool::from(constant_time_token_eq("abc", "abcd")));
    }

    #[test]
    fn debug_hides_tokens() {
        let debug = format!("{:?}", table());
        assert!(!debug.contains("secret"));
    }

    // ── Middleware ───────────────────────────────────────────────

    #[tokio::test]
    async fn valid_token_injects_principal() {
        let (status, body) = call(test_app(table()), Some("Bearer bob-secret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "bob");
    }

    #[tokio::test]
    async fn unknown_token_rejected() {
        let (status, body) = call(test_app(table()), Some("Bearer nope")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("UNAUTHORIZED"));
    }

    #[tokio::test]
    async fn missing_header_rejected() {
        let (status, body) = call(test_app(table()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("missing authorization header"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let (status, _) = call(test_app(table()), Some("Basic YWxpY2U6eA==")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_table_rejects_everything() {
        let (status, _) = call(test_app(TokenTable::default()), Some("Bearer anything")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
