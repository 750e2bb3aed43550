use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Everything a resource handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    MalformedBody(String),

    #[error("{0}")]
    InvalidPath(String),

    #[error("If-Match must name the version being replaced")]
    PreconditionRequired,

    #[error("{0}")]
    InvalidPrecondition(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Store(StoreError::Validation { .. }) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            ApiError::Store(StoreError::IdentityMismatch { .. }) => {
                (StatusCode::BAD_REQUEST, "identity_mismatch")
            }
            ApiError::Store(StoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "not_found"),
            // Surfaced as-is, never downgraded to a client error.
            ApiError::Store(StoreError::ConcurrencyConflict { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "concurrency_conflict")
            }
            ApiError::Store(StoreError::IdSpaceExhausted { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error")
            }
            ApiError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
            ApiError::PreconditionRequired => {
                (StatusCode::PRECONDITION_REQUIRED, "if_match_required")
            }
            ApiError::InvalidPrecondition(_) => (StatusCode::BAD_REQUEST, "invalid_if_match"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();
        if status.is_server_error() {
            error!(code, %message, "Request failed");
        }
        json_error(status, code, message)
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
