//! Error types for squadplan-server

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type alias for handler operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors a handler can return
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    /// Error from squadplan-core
    #[error(transparent)]
    Core(#[from] squadplan_core::Error),

    /// A blocking file task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(squadplan_core::Error::VersionConflict { .. }) => StatusCode::CONFLICT,
            ApiError::Core(squadplan_core::Error::DateOutOfRange { .. }) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error category.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Core(e) => e.kind(),
            ApiError::Join(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, category = self.category(), "Request failed: {self}");
        } else {
            tracing::warn!(category = self.category(), "Request rejected: {self}");
        }
        let body = serde_json::json!({
            "error": {
                "category": self.category(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}
