//! # Administration & Chain Routes
//!
//! - `POST /v1/admin/pause`: toggle the pause flag (owner only).
//! - `GET /v1/status`: owner, pause state, height, record and request counts.
//! - `GET /v1/chain/height`: current clock height.
//! - `POST /v1/chain/advance`: move the clock forward (owner only).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use vcreg_core::BlockHeight;
use vcreg_registry::RegistryError;

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// New pause flag after a toggle.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PauseResponse {
    pub paused: bool,
}

/// Registry status overview.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub owner: String,
    pub paused: bool,
    pub height: u64,
    pub identities: usize,
    pub credentials: usize,
    /// Requests served since startup.
    pub requests_total: u64,
    /// Requests that ended in a 4xx/5xx since startup.
    pub errors_total: u64,
}

/// Current clock height.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HeightResponse {
    pub height: u64,
}

/// Clock advance request. Give either `blocks` or `to`, not both.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AdvanceRequest {
    /// Number of blocks to advance. Defaults to 1 when `to` is absent.
    pub blocks: Option<u64>,
    /// Absolute target height; must not be below the current height.
    pub to: Option<u64>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/pause", post(toggle_pause))
        .route("/v1/status", get(status))
        .route("/v1/chain/height", get(chain_height))
        .route("/v1/chain/advance", post(advance_chain))
}

fn require_owner(state: &AppState, caller: &CallerIdentity) -> Result<(), AppError> {
    if caller.principal != *state.registry.owner() {
        tracing::warn!(caller = %caller.principal, "owner-only endpoint rejected");
        return Err(RegistryError::NotAuthorized.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/admin/pause: Flip the pause flag.
#[utoipa::path(
    post,
    path = "/v1/admin/pause",
    responses(
        (status = 200, description = "New pause state", body = PauseResponse),
        (status = 403, description = "Caller is not the owner", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
pub(crate) async fn toggle_pause(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<PauseResponse>, AppError> {
    let paused = state.registry.toggle_pause(&caller.principal)?;
    Ok(Json(PauseResponse { paused }))
}

/// GET /v1/status: Registry overview.
#[utoipa::path(
    get,
    path = "/v1/status",
    responses((status = 200, description = "Registry status", body = StatusResponse)),
    tag = "admin"
)]
pub(crate) async fn status(
    State(state): State<AppState>,
    _caller: CallerIdentity,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        owner: state.registry.owner().to_string(),
        paused: state.registry.is_paused(),
        height: state.clock.current().value(),
        identities: state.registry.identity_count(),
        credentials: state.registry.credential_count(),
        requests_total: state.metrics.requests(),
        errors_total: state.metrics.errors(),
    })
}

/// GET /v1/chain/height: Current clock height.
#[utoipa::path(
    get,
    path = "/v1/chain/height",
    responses((status = 200, description = "Current height", body = HeightResponse)),
    tag = "chain"
)]
pub(crate) async fn chain_height(
    State(state): State<AppState>,
    _caller: CallerIdentity,
) -> Json<HeightResponse> {
    Json(HeightResponse {
        height: state.clock.current().value(),
    })
}

/// POST /v1/chain/advance: Move the clock forward.
#[utoipa::path(
    post,
    path = "/v1/chain/advance",
    request_body = AdvanceRequest,
    responses(
        (status = 200, description = "New height", body = HeightResponse),
        (status = 403, description = "Caller is not the owner", body = crate::error::ErrorBody),
        (status = 409, description = "Target height is in the past", body = crate::error::ErrorBody),
        (status = 422, description = "Both `blocks` and `to` given", body = crate::error::ErrorBody),
    ),
    tag = "chain"
)]
pub(crate) async fn advance_chain(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<AdvanceRequest>, JsonRejection>,
) -> Result<Json<HeightResponse>, AppError> {
    require_owner(&state, &caller)?;
    let req = extract_json(body)?;
    let height = match (req.blocks, req.to) {
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "give either `blocks` or `to`, not both".into(),
            ))
        }
        (None, Some(to)) => {
            state.set_clock(BlockHeight(to))?;
            BlockHeight(to)
        }
        (blocks, None) => state.advance_clock(blocks.unwrap_or(1)),
    };
    tracing::info!(height = %height, "chain clock advanced");
    Ok(Json(HeightResponse {
        height: height.value(),
    }))
}
