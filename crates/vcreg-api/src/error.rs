//! # API Error Types
//!
//! [`AppError`] implements `IntoResponse` and renders every failure as
//! `{"error": {"code", "message", "details"?}}`.
//!
//! Registry failures keep their own machine-readable kind as the `code` and
//! carry the numeric registry error code in `details.registry_code`.
//!
//! | Source | Status | Code |
//! |--------|--------|------|
//! | `NotAuthorized` | 403 | `NOT_AUTHORIZED` |
//! | `IdentityExists` | 409 | `IDENTITY_EXISTS` |
//! | `IdentityNotFound` | 404 | `IDENTITY_NOT_FOUND` |
//! | `CredentialExists` | 409 | `CREDENTIAL_EXISTS` |
//! | `CredentialNotFound` | 404 | `CREDENTIAL_NOT_FOUND` |
//! | `ContractPaused` | 423 | `CONTRACT_PAUSED` |
//! | field validation | 422 | `VALIDATION_ERROR` |
//! | malformed body | 400 | `BAD_REQUEST` |
//! | missing/unknown token | 401 | `UNAUTHORIZED` |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use vcreg_core::ValidationError;
use vcreg_registry::{ClockError, RegistryError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "CONTRACT_PAUSED", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context, present for registry errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A registry operation was rejected.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// Request field validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Conflict with current server state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Registry(e) => (registry_status(e), e.kind()),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

fn registry_status(err: &RegistryError) -> StatusCode {
    match err {
        RegistryError::NotAuthorized => StatusCode::FORBIDDEN,
        RegistryError::IdentityExists | RegistryError::CredentialExists => StatusCode::CONFLICT,
        RegistryError::IdentityNotFound | RegistryError::CredentialNotFound => {
            StatusCode::NOT_FOUND
        }
        RegistryError::ContractPaused => StatusCode::LOCKED,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let details = match &self {
            Self::Registry(e) => Some(serde_json::json!({ "registry_code": e.code() })),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ClockError> for AppError {
    fn from(err: ClockError) -> Self {
        Self::Conflict(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use vcreg_core::BlockHeight;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn registry_errors_map_to_statuses() {
        let cases = [
            (RegistryError::NotAuthorized, StatusCode::FORBIDDEN, "NOT_AUTHORIZED"),
            (RegistryError::IdentityExists, StatusCode::CONFLICT, "IDENTITY_EXISTS"),
            (RegistryError::IdentityNotFound, StatusCode::NOT_FOUND, "IDENTITY_NOT_FOUND"),
            (RegistryError::CredentialExists, StatusCode::CONFLICT, "CREDENTIAL_EXISTS"),
            (RegistryError::CredentialNotFound, StatusCode::NOT_FOUND, "CREDENTIAL_NOT_FOUND"),
            (RegistryError::ContractPaused, StatusCode::LOCKED, "CONTRACT_PAUSED"),
        ];
        for (err, status, code) in cases {
            assert_eq!(AppError::from(err).status_and_code(), (status, code), "{err:?}");
        }
    }

    #[test]
    fn boundary_errors_map_to_statuses() {
        assert_eq!(
            AppError::Validation("x".into()).status_and_code().0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::BadRequest("x".into()).status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("x".into()).status_and_code().0, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Conflict("x".into()).status_and_code().0, StatusCode::CONFLICT);
    }

    #[test]
    fn validation_error_converts() {
        let app_err = AppError::from(ValidationError::EmptyPrincipal);
        assert!(matches!(app_err, AppError::Validation(_)));
    }

    #[test]
    fn clock_regression_is_conflict() {
        let err = AppError::from(ClockError::Regression {
            current: BlockHeight(5),
            requested: BlockHeight(4),
        });
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn registry_error_body_carries_numeric_code() {
        let (status, body) = response_parts(RegistryError::ContractPaused.into()).await;
        assert_eq!(status, StatusCode::LOCKED);
        assert_eq!(body.error.code, "CONTRACT_PAUSED");
        assert_eq!(
            body.error.details,
            Some(serde_json::json!({ "registry_code": RegistryError::ContractPaused.code() }))
        );
    }

    #[tokio::test]
    async fn validation_body_has_no_details() {
        let (status, body) = response_parts(AppError::Validation("did too long".into())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.error.message.contains("did too long"));
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let (status, body) = response_parts(AppError::Internal("lock poisoned".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.message, "An internal error occurred");
    }
}
