//! # Request Body Extraction
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_json`], so malformed bodies become a structured 400 instead of
//! axum's plain-text rejection. Field-level checks (length bounds, ASCII,
//! key encoding) happen afterwards via [`IntoDomain`] and surface as 422.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use vcreg_core::ValidationError;

use crate::error::AppError;

/// Request DTOs that convert raw wire strings into validated domain values.
pub trait IntoDomain {
    /// The validated form.
    type Output;

    /// Validate every field and build the domain value.
    fn into_domain(self) -> Result<Self::Output, ValidationError>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and run its [`IntoDomain`] conversion.
pub fn extract_domain<T: IntoDomain>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T::Output, AppError> {
    let raw = extract_json(result)?;
    Ok(raw.into_domain()?)
}
