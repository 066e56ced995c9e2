//! Error types for antistress-api
//!
//! Response bodies use the `{"detail": ...}` shape existing clients expect:
//! a list of field errors for rejected input, a fixed message otherwise.

use antistress_common::{Locale, ValidationErrors};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::service::ServiceError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body rejected before any side effect (422)
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Pipeline step failed (500); carries the client-facing message only
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Translate an orchestration failure into its fixed message
    pub fn service(error: &ServiceError, locale: Locale) -> Self {
        ApiError::Internal(locale.failure(error.failure()).to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": errors })),
            )
                .into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": message })),
            )
                .into_response(),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
