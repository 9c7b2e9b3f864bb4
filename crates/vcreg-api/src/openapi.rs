//! # OpenAPI Specification Assembly
//!
//! Collects every utoipa-documented route into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI spec for the registry API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "vcreg: Identity & Verifiable Credential Registry",
        version = "0.1.0",
        description = "Self-sovereign identity registration and credential issuance, verification, and revocation keyed by principal.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Identities
        crate::routes::identity::create_identity,
        crate::routes::identity::update_metadata,
        crate::routes::identity::get_identity,
        crate::routes::identity::identity_exists,
        // Credentials
        crate::routes::credentials::issue_credential,
        crate::routes::credentials::verify_credential,
        crate::routes::credentials::revoke_credential,
        // Admin & chain
        crate::routes::admin::toggle_pause,
        crate::routes::admin::status,
        crate::routes::admin::chain_height,
        crate::routes::admin::advance_chain,
    ),
    components(schemas(
        crate::routes::identity::CreateIdentityRequest,
        crate::routes::identity::UpdateMetadataRequest,
        crate::routes::identity::IdentityResponse,
        crate::routes::identity::ExistsResponse,
        crate::routes::credentials::IssueCredentialRequest,
        crate::routes::credentials::CredentialResponse,
        crate::routes::credentials::VerifyResponse,
        crate::routes::admin::PauseResponse,
        crate::routes::admin::StatusResponse,
        crate::routes::admin::HeightResponse,
        crate::routes::admin::AdvanceRequest,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "identities", description = "Identity registration and lookup"),
        (name = "credentials", description = "Credential issuance, verification, revocation"),
        (name = "admin", description = "Owner administration and status"),
        (name = "chain", description = "Height clock"),
    )
)]
pub struct ApiDoc;

/// Registers the bearer token security scheme.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
