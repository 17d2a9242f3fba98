//! # API Error Type
//!
//! Unified error body for every HTTP handler.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler ──► Service ── ServiceError ──► ApiError ──► HTTP response    │
//! │                                                                         │
//! │  ValidationError ─────────────► 400 VALIDATION_ERROR  (+ field)        │
//! │  CoreError::NotFound ─────────► 404 NOT_FOUND                           │
//! │  CoreError::Conflict ─────────► 409 CONFLICT                            │
//! │  DbError (retryable) ─────────► 503 SERVICE_UNAVAILABLE                 │
//! │  DbError (other) ─────────────► 500 DATABASE_ERROR                      │
//! │                                                                         │
//! │  Database detail is logged here and never sent to the client.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Body
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "Invalid CPF format",
//!   "field": "CustomerCpf"
//! }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use motorhub_core::{CoreError, ValidationError};
use motorhub_db::DbError;
use serde::Serialize;
use tracing::error;

use crate::services::ServiceError;

/// Error returned by every handler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message
    pub message: String,

    /// Offending request field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Resource not found (404)
    NotFound,

    /// Resource state forbids the operation (409)
    Conflict,

    /// Transient storage failure; retry (503)
    ServiceUnavailable,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Creates a validation error naming the offending field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::invalid_field(err.field().to_string(), err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::Conflict(message) => ApiError::new(ErrorCode::Conflict, message),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        if err.is_retryable() {
            error!(error = %err, "Transient database failure");
            return ApiError::new(
                ErrorCode::ServiceUnavailable,
                "The request could not be completed, please retry",
            );
        }

        error!(error = %err, "Database operation failed");
        ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => e.into(),
            ServiceError::Storage(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(ErrorCode::ValidationError, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(ErrorCode::ValidationError, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(ErrorCode::ValidationError, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
