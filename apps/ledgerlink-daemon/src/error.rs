//! # API Error Type
//!
//! What an HTTP caller receives when a route fails.
//!
//! ```text
//! SyncError::NotFound          ──► 404 NOT_FOUND
//! SyncError::Validation        ──► 400 VALIDATION_ERROR
//! SyncError::AlreadyRunning    ──► 409 ALREADY_RUNNING
//! SyncError::Remote / Decode   ──► 502 REMOTE_ERROR
//! SyncError::DatabaseError     ──► 500 DATABASE_ERROR
//! anything else                ──► 500 INTERNAL
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledgerlink_sync::SyncError;
use serde::Serialize;

/// Error body returned from routes.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Order not found: 42" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    AlreadyRunning,
    RemoteError,
    DatabaseError,
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::AlreadyRunning => StatusCode::CONFLICT,
            ErrorCode::RemoteError => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        let code = match &err {
            SyncError::NotFound { .. } => ErrorCode::NotFound,
            SyncError::Validation(_) => ErrorCode::ValidationError,
            SyncError::AlreadyRunning(_) => ErrorCode::AlreadyRunning,
            SyncError::Remote { .. } | SyncError::Decode(_) => ErrorCode::RemoteError,
            SyncError::DatabaseError(e) => {
                tracing::error!("Database error: {}", e);
                return ApiError::new(ErrorCode::DatabaseError, "Database operation failed");
            }
            _ => ErrorCode::Internal,
        };
        ApiError::new(code, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}
