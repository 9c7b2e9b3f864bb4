//! # Credential Routes
//!
//! - `POST /v1/credentials`: issue a credential; the caller becomes issuer.
//! - `GET /v1/credentials/:subject/:credential_id`: verify at the current height.
//! - `DELETE /v1/credentials/:subject/:credential_id`: revoke (issuer only).
//!
//! Verification never fails on a missing or expired credential: it answers
//! `{"valid": false, "credential": null}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use vcreg_core::{
    BlockHeight, CredentialData, CredentialId, CredentialType, Principal, ValidationError,
};
use vcreg_registry::Credential;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_domain, IntoDomain};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for credential issuance.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueCredentialRequest {
    /// Subject principal; must have a registered identity.
    pub subject: String,
    /// Identifier, unique per subject, up to 100 ASCII characters.
    pub credential_id: String,
    /// Category tag, up to 50 ASCII characters.
    pub credential_type: String,
    /// Opaque payload, up to 1000 ASCII characters.
    #[serde(default)]
    pub data: String,
    /// Height from which the credential stops verifying. Omit for no expiry.
    pub expires_at: Option<u64>,
}

/// Validated issuance arguments.
pub struct IssueArgs {
    pub subject: Principal,
    pub credential_id: CredentialId,
    pub credential_type: CredentialType,
    pub data: CredentialData,
    pub expires_at: Option<BlockHeight>,
}

impl IntoDomain for IssueCredentialRequest {
    type Output = IssueArgs;

    fn into_domain(self) -> Result<IssueArgs, ValidationError> {
        Ok(IssueArgs {
            subject: Principal::new(self.subject)?,
            credential_id: CredentialId::new(self.credential_id)?,
            credential_type: CredentialType::new(self.credential_type)?,
            data: CredentialData::new(self.data)?,
            expires_at: self.expires_at.map(BlockHeight),
        })
    }
}

/// A credential as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CredentialResponse {
    pub subject: String,
    pub credential_id: String,
    pub issuer: String,
    pub credential_type: String,
    pub data: String,
    pub issued_at: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl CredentialResponse {
    fn new(subject: &Principal, credential_id: &CredentialId, credential: Credential) -> Self {
        Self {
            subject: subject.to_string(),
            credential_id: credential_id.to_string(),
            issuer: credential.issuer.into(),
            credential_type: credential.credential_type.into(),
            data: credential.data.into(),
            issued_at: credential.issued_at.value(),
            expires_at: credential.expires_at.map(|h| h.value()),
        }
    }
}

/// Verification result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    /// Whether the credential exists and has not expired.
    pub valid: bool,
    /// Height the check was evaluated at.
    pub height: u64,
    /// The credential, when valid.
    pub credential: Option<CredentialResponse>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the credentials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/credentials", post(issue_credential))
        .route(
            "/v1/credentials/:subject/:credential_id",
            get(verify_credential).delete(revoke_credential),
        )
}

fn parse_key(subject: String, credential_id: String) -> Result<(Principal, CredentialId), AppError> {
    Ok((Principal::new(subject)?, CredentialId::new(credential_id)?))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/credentials: Issue a credential with the caller as issuer.
#[utoipa::path(
    post,
    path = "/v1/credentials",
    request_body = IssueCredentialRequest,
    responses(
        (status = 201, description = "Credential issued", body = CredentialResponse),
        (status = 404, description = "Subject has no identity", body = crate::error::ErrorBody),
        (status = 409, description = "Credential id already used for subject", body = crate::error::ErrorBody),
        (status = 422, description = "Field validation failed", body = crate::error::ErrorBody),
        (status = 423, description = "Registry paused", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn issue_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<IssueCredentialRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CredentialResponse>), AppError> {
    let args = extract_domain(body)?;
    let credential = state.with_context(&caller, |ctx| {
        state.registry.issue_credential(
            ctx,
            args.subject.clone(),
            args.credential_id.clone(),
            args.credential_type.clone(),
            args.data.clone(),
            args.expires_at,
        )?;
        Ok::<_, AppError>(Credential {
            issuer: ctx.caller.clone(),
            credential_type: args.credential_type.clone(),
            data: args.data.clone(),
            issued_at: ctx.height,
            expires_at: args.expires_at,
        })
    })?;
    Ok((
        StatusCode::CREATED,
        Json(CredentialResponse::new(
            &args.subject,
            &args.credential_id,
            credential,
        )),
    ))
}

/// GET /v1/credentials/:subject/:credential_id: Verify at the current height.
#[utoipa::path(
    get,
    path = "/v1/credentials/{subject}/{credential_id}",
    params(
        ("subject" = String, Path, description = "Subject principal"),
        ("credential_id" = String, Path, description = "Credential identifier"),
    ),
    responses(
        (status = 200, description = "Verification result", body = VerifyResponse),
    ),
    tag = "credentials"
)]
pub(crate) async fn verify_credential(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path((subject, credential_id)): Path<(String, String)>,
) -> Result<Json<VerifyResponse>, AppError> {
    let (subject, credential_id) = parse_key(subject, credential_id)?;
    let height = state.clock.current();
    let credential = state
        .registry
        .verify_credential(&subject, &credential_id, height)
        .map(|c| CredentialResponse::new(&subject, &credential_id, c));
    Ok(Json(VerifyResponse {
        valid: credential.is_some(),
        height: height.value(),
        credential,
    }))
}

/// DELETE /v1/credentials/:subject/:credential_id: Revoke a credential.
#[utoipa::path(
    delete,
    path = "/v1/credentials/{subject}/{credential_id}",
    params(
        ("subject" = String, Path, description = "Subject principal"),
        ("credential_id" = String, Path, description = "Credential identifier"),
    ),
    responses(
        (status = 204, description = "Credential revoked"),
        (status = 403, description = "Caller is not the issuer", body = crate::error::ErrorBody),
        (status = 404, description = "Credential not found", body = crate::error::ErrorBody),
        (status = 423, description = "Registry paused", body = crate::error::ErrorBody),
    ),
    tag = "credentials"
)]
pub(crate) async fn revoke_credential(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((subject, credential_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let (subject, credential_id) = parse_key(subject, credential_id)?;
    state.with_context(&caller, |ctx| {
        state
            .registry
            .revoke_credential(ctx, &subject, &credential_id)
    })?;
    Ok(StatusCode::NO_CONTENT)
}
