use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use werkstatt_core::{CoreError, FieldViolation};
use werkstatt_store::StoreError;
use werkstatt_sync::DirectoryError;

use crate::auth::provider::IdentityError;

/// Application-level error type for API handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(id) => Self::Core(CoreError::NotFound {
                entity: "Customer",
                id,
            }),
            DirectoryError::Store(e) => Self::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Core(CoreError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} not found: {id}"),
            ),
            AppError::Core(CoreError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
            }
            AppError::Store(StoreError::Subscribe(msg)) => {
                tracing::error!("Store unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The record store is unavailable".to_string(),
                )
            }
            AppError::Store(StoreError::Write(msg)) => {
                tracing::error!("Store write failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORE_WRITE_FAILED",
                    "The record store rejected the write".to_string(),
                )
            }
            // Validation carries a structured `fields` payload instead of the
            // plain error/code shape.
            AppError::Validation(fields) => {
                let body = Json(json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_ERROR",
                    "fields": fields,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Identity(IdentityError::EmailAlreadyInUse) => (
                StatusCode::CONFLICT,
                "EMAIL_IN_USE",
                "An account with this email already exists".to_string(),
            ),
            AppError::Identity(IdentityError::WeakPassword(msg)) => {
                (StatusCode::BAD_REQUEST, "WEAK_PASSWORD", msg)
            }
            AppError::Identity(IdentityError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password".to_string(),
            ),
            AppError::Identity(IdentityError::InvalidEmail) => (
                StatusCode::BAD_REQUEST,
                "INVALID_EMAIL",
                "Email address is not valid".to_string(),
            ),
            AppError::Identity(IdentityError::Internal(msg)) => {
                tracing::error!("Identity error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Convenience alias for handler results.
pub type ApiResult<T> = Result<T, AppError>;
