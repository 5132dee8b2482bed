//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::storage::StorageError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing X-API-Key header")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API key is disabled")]
    ApiKeyDisabled,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Batch too large: {size} records (max {max})")]
    BatchTooLarge { size: usize, max: usize },

    // Server errors (5xx)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::BatchTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "batch_too_large", None)
            }

            // 401 Unauthorized
            AppError::MissingApiKey => {
                (StatusCode::UNAUTHORIZED, "missing_api_key", None)
            }
            AppError::InvalidApiKey => {
                (StatusCode::UNAUTHORIZED, "invalid_api_key", None)
            }
            AppError::ApiKeyDisabled => {
                (StatusCode::UNAUTHORIZED, "api_key_disabled", None)
            }

            // 403 Forbidden
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone()))
            }

            // 404 Not Found
            AppError::StudentNotFound(number) => {
                (StatusCode::NOT_FOUND, "student_not_found", Some(number.clone()))
            }

            // 409 Conflict
            AppError::Storage(StorageError::DuplicateStudent(number)) => {
                (StatusCode::CONFLICT, "duplicate_student", Some(number.clone()))
            }
            AppError::Storage(StorageError::DuplicateReference(reference)) => {
                (StatusCode::CONFLICT, "duplicate_reference", Some(reference.clone()))
            }

            // 500 Internal Server Error
            AppError::Storage(StorageError::Database(e)) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
