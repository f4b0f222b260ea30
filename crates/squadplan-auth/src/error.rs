//! Auth-specific error types.

use axum::response::{IntoResponse, Redirect, Response};
use http::StatusCode;

/// Where unauthenticated browsers are sent.
pub const LOGIN_PATH: &str = "/login";

/// Errors that can occur during authentication and authorisation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No identity in the session and bypass is off.
    #[error("not logged in")]
    Unauthenticated,

    /// Logged in, but with the wrong role.
    #[error("forbidden: {required} role required")]
    Forbidden {
        /// Role the operation needs
        required: crate::Role,
    },

    /// Username/password pair matched neither account.
    #[error("invalid credentials")]
    Rejected,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthenticated => Redirect::to(LOGIN_PATH).into_response(),
            AuthError::Forbidden { .. } => error_response(StatusCode::FORBIDDEN, &self),
            AuthError::Rejected => error_response(StatusCode::UNAUTHORIZED, &self),
        }
    }
}

/// Build a JSON error body in the same shape as the rest of the API.
fn error_response(status: StatusCode, err: &AuthError) -> Response {
    let body = serde_json::json!({
        "error": {
            "category": "authorization",
            "message": err.to_string(),
        }
    });
    (
        status,
        [(http::header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response()
}
