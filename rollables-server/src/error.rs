//! API error types with IntoResponse
//!
//! Resolver failures are converted to JSON responses with matching status
//! codes. Out-of-bounds requests never echo a filesystem path.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rollables_core::ResolveError;
use serde_json::json;
use tokio::task::JoinError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// No table for the requested entry (404)
    NotFound { entry: String },

    /// Entry resolves outside the table root (400)
    OutOfBounds,

    /// Filesystem or runtime failure (500, logged)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotFound { entry } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("entry '{}' not found", entry)
                }),
            ),
            Self::OutOfBounds => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "out_of_bounds",
                    "message": "entry is outside the table root"
                }),
            ),
            Self::Internal { message } => {
                // Log the actual error, return generic message
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::NotFound { entry } => Self::NotFound { entry },
            ResolveError::OutOfBounds { .. } => Self::OutOfBounds,
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl From<JoinError> for ApiError {
    fn from(e: JoinError) -> Self {
        Self::Internal {
            message: format!("resolver task failed: {}", e),
        }
    }
}
