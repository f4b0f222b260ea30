//! HTTP surface for SquadPlan.
//!
//! Provides:
//! - [`ServerConfig`] / [`Settings`] - flag and environment configuration
//! - [`AppState`] - settings, authenticator, sessions and the save lock
//! - [`build_router`] - every route wrapped in the session and trace layers
//! - [`ApiError`] - core errors rendered as JSON responses

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod pages;
pub mod state;

pub use config::{DEFAULT_SECRET, ServerConfig, Settings};
pub use error::{ApiError, Result};
pub use health::HealthResponse;
pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use squadplan_auth::SessionLayer;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let sessions = SessionLayer::new(
        state.sessions.clone(),
        state.authenticator.clone(),
        state.key.clone(),
    );
    Router::new()
        .route("/login", get(handlers::login_page).post(handlers::login_submit))
        .route("/logout", get(handlers::logout))
        .route("/", get(handlers::index))
        .route("/data", get(handlers::data))
        .route("/save", post(handlers::save))
        .route("/export", get(handlers::export))
        .route("/data_raw", get(handlers::data_raw))
        .route("/healthz", get(handlers::healthz))
        .route("/workdays", get(handlers::workdays))
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
