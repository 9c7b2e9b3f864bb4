//! # Identity Routes
//!
//! - `POST /v1/identities`: register an identity for the caller.
//! - `PUT /v1/identities/me/metadata`: replace the caller's metadata.
//! - `GET /v1/identities/:principal`: fetch an identity.
//! - `GET /v1/identities/:principal/exists`: existence check.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use vcreg_core::{Did, Metadata, Principal, PublicKey, ValidationError};
use vcreg_registry::{Identity, RegistryError};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_domain, IntoDomain};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for identity registration.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIdentityRequest {
    /// Decentralized identifier, up to 100 ASCII characters.
    pub did: String,
    /// 33-byte compressed public key, hex encoded (optional `0x` prefix).
    pub public_key: String,
    /// Free-form metadata, up to 500 ASCII characters.
    #[serde(default)]
    pub metadata: String,
}

impl IntoDomain for CreateIdentityRequest {
    type Output = (Did, PublicKey, Metadata);

    fn into_domain(self) -> Result<Self::Output, ValidationError> {
        Ok((
            Did::new(self.did)?,
            PublicKey::from_hex(&self.public_key)?,
            Metadata::new(self.metadata)?,
        ))
    }
}

/// Request body for a metadata update.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMetadataRequest {
    pub metadata: String,
}

impl IntoDomain for UpdateMetadataRequest {
    type Output = Metadata;

    fn into_domain(self) -> Result<Metadata, ValidationError> {
        Metadata::new(self.metadata)
    }
}

/// An identity as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdentityResponse {
    pub principal: String,
    pub did: String,
    /// Hex-encoded compressed public key.
    pub public_key: String,
    /// Registration height.
    pub created_at: u64,
    pub metadata: String,
}

impl IdentityResponse {
    fn new(principal: &Principal, identity: Identity) -> Self {
        Self {
            principal: principal.to_string(),
            did: identity.did.into(),
            public_key: identity.public_key.to_hex(),
            created_at: identity.created_at.value(),
            metadata: identity.metadata.into(),
        }
    }
}

/// Existence check result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExistsResponse {
    pub principal: String,
    pub exists: bool,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the identity router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/identities", post(create_identity))
        .route("/v1/identities/me/metadata", put(update_metadata))
        .route("/v1/identities/:principal", get(get_identity))
        .route("/v1/identities/:principal/exists", get(identity_exists))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/identities: Register an identity for the authenticated caller.
#[utoipa::path(
    post,
    path = "/v1/identities",
    request_body = CreateIdentityRequest,
    responses(
        (status = 201, description = "Identity registered", body = IdentityResponse),
        (status = 409, description = "Caller already has an identity", body = crate::error::ErrorBody),
        (status = 422, description = "Field validation failed", body = crate::error::ErrorBody),
        (status = 423, description = "Registry paused", body = crate::error::ErrorBody),
    ),
    tag = "identities"
)]
pub(crate) async fn create_identity(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateIdentityRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IdentityResponse>), AppError> {
    let (did, public_key, metadata) = extract_domain(body)?;
    let identity = state.with_context(&caller, |ctx| {
        state
            .registry
            .create_identity(ctx, did.clone(), public_key, metadata.clone())?;
        Ok::<_, AppError>(Identity {
            did,
            public_key,
            created_at: ctx.height,
            metadata,
        })
    })?;
    Ok((
        StatusCode::CREATED,
        Json(IdentityResponse::new(&caller.principal, identity)),
    ))
}

/// PUT /v1/identities/me/metadata: Replace the caller's identity metadata.
#[utoipa::path(
    put,
    path = "/v1/identities/me/metadata",
    request_body = UpdateMetadataRequest,
    responses(
        (status = 200, description = "Metadata replaced", body = IdentityResponse),
        (status = 404, description = "Caller has no identity", body = crate::error::ErrorBody),
        (status = 423, description = "Registry paused", body = crate::error::ErrorBody),
    ),
    tag = "identities"
)]
pub(crate) async fn update_metadata(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<UpdateMetadataRequest>, JsonRejection>,
) -> Result<Json<IdentityResponse>, AppError> {
    let metadata = extract_domain(body)?;
    state.with_context(&caller, |ctx| {
        state.registry.update_identity_metadata(ctx, metadata)
    })?;
    let identity = state
        .registry
        .get_identity(&caller.principal)
        .ok_or_else(|| AppError::Internal("identity vanished after metadata update".into()))?;
    Ok(Json(IdentityResponse::new(&caller.principal, identity)))
}

/// GET /v1/identities/:principal: Fetch a registered identity.
#[utoipa::path(
    get,
    path = "/v1/identities/{principal}",
    params(("principal" = String, Path, description = "Owning principal")),
    responses(
        (status = 200, description = "Identity found", body = IdentityResponse),
        (status = 404, description = "No identity for principal", body = crate::error::ErrorBody),
    ),
    tag = "identities"
)]
pub(crate) async fn get_identity(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(principal): Path<String>,
) -> Result<Json<IdentityResponse>, AppError> {
    let principal = Principal::new(principal)?;
    let identity = state
        .registry
        .get_identity(&principal)
        .ok_or(RegistryError::IdentityNotFound)?;
    Ok(Json(IdentityResponse::new(&principal, identity)))
}

/// GET /v1/identities/:principal/exists: Whether a principal has an identity.
#[utoipa::path(
    get,
    path = "/v1/identities/{principal}/exists",
    params(("principal" = String, Path, description = "Principal to check")),
    responses(
        (status = 200, description = "Existence flag", body = ExistsResponse),
    ),
    tag = "identities"
)]
pub(crate) async fn identity_exists(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(principal): Path<String>,
) -> Result<Json<ExistsResponse>, AppError> {
    let principal = Principal::new(principal)?;
    let exists = state.registry.identity_exists(&principal);
    Ok(Json(ExistsResponse {
        principal: principal.into(),
        exists,
    }))
}
