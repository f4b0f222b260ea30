//! Route handlers.

use axum::Json;
use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::SignedCookieJar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use squadplan_auth::{
    AdminUser, AuthError, CurrentUser, SESSION_COOKIE, SessionStore, expired_session_cookie,
    new_session_token, session_cookie,
};
use squadplan_core::{Configuration, add_work_days, codec};
use tracing::{debug, info};

use crate::error::Result;
use crate::health::HealthResponse;
use crate::pages::{self, IndexPage};
use crate::state::AppState;

/// Submitted login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Login name.
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// `GET /workdays` query.
#[derive(Debug, Deserialize)]
pub struct WorkdaysQuery {
    /// First day.
    pub start: NaiveDate,
    /// Work days to add.
    pub days: u32,
}

/// `GET /workdays` response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkdaysResponse {
    /// First day.
    pub start: NaiveDate,
    /// Work days added.
    pub days: u32,
    /// Resulting date.
    pub end: NaiveDate,
}

/// `GET /login`
pub async fn login_page() -> Html<String> {
    Html(pages::login(None))
}

/// `POST /login`
pub async fn login_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.authenticator.login(&form.username, &form.password) {
        // Every request is already the administrator; no session to record.
        Ok(_) if state.authenticator.bypass() => found("/"),
        Ok(identity) => {
            if let Some(previous) = jar.get(SESSION_COOKIE) {
                state.sessions.clear(previous.value());
            }
            let token = new_session_token();
            info!(
                user = identity.username().unwrap_or_default(),
                role = ?identity.role(),
                "Login succeeded"
            );
            state.sessions.set(&token, identity);
            (jar.add(session_cookie(token)), found("/")).into_response()
        }
        Err(AuthError::Rejected) => Html(pages::login(Some("Invalid credentials"))).into_response(),
        Err(err) => err.into_response(),
    }
}

/// `GET /logout`
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.clear(cookie.value());
        debug!("Session cleared");
    }
    (jar.remove(expired_session_cookie()), found("/login")).into_response()
}

/// `GET /`
pub async fn index(State(state): State<AppState>, user: CurrentUser) -> Html<String> {
    Html(pages::index(&IndexPage {
        username: &user.username,
        is_admin: user.is_admin(),
        day_px: state.settings.day_px,
        weekend: state.settings.weekend,
    }))
}

/// `GET /data`
pub async fn data(State(state): State<AppState>, _user: CurrentUser) -> Result<Response> {
    let settings = state.settings.clone();
    let loaded = tokio::task::spawn_blocking(move || {
        codec::load_versioned(&settings.config_path, &settings.categories)
    })
    .await??;
    debug!(squads = loaded.config.len(), "Loaded configuration");
    Ok(([(header::ETAG, etag(&loaded.version))], Json(loaded.config)).into_response())
}

/// `POST /save`
pub async fn save(
    State(state): State<AppState>,
    admin: AdminUser,
    headers: HeaderMap,
    Json(config): Json<Configuration>,
) -> Result<Response> {
    let expected = if_match(&headers);
    let squads = config.len();

    let _guard = state.save_lock.lock().await;
    let settings = state.settings.clone();
    let version = tokio::task::spawn_blocking(move || {
        codec::save_checked(
            &settings.config_path,
            &config,
            &settings.categories,
            expected.as_deref(),
        )
    })
    .await??;

    info!(user = %admin.username, squads, "Saved configuration");
    Ok((
        [(header::ETAG, etag(&version))],
        Json(json!({ "status": "ok" })),
    )
        .into_response())
}

/// `GET /export`
pub async fn export(State(state): State<AppState>, _user: CurrentUser) -> Result<Response> {
    let path = state.settings.config_path.clone();
    let bytes = tokio::task::spawn_blocking(move || codec::read_raw(&path)).await??;
    let filename = state
        .settings
        .config_path
        .file_name()
        .map(|name| name.to_string_lossy().replace('"', ""))
        .unwrap_or_else(|| "resource_config.xml".to_string());
    Ok((
        [
            (header::CONTENT_TYPE, "application/xml".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (header::ETAG, etag(&codec::version_token(&bytes))),
        ],
        bytes,
    )
        .into_response())
}

/// `GET /data_raw`
pub async fn data_raw(State(state): State<AppState>) -> Result<Response> {
    let path = state.settings.config_path.clone();
    let bytes = tokio::task::spawn_blocking(move || codec::read_raw(&path)).await??;
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], bytes).into_response())
}

/// `GET /healthz`
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::probe(&state.settings.config_path).await)
}

/// `GET /workdays`
pub async fn workdays(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<WorkdaysQuery>,
) -> Result<Json<WorkdaysResponse>> {
    let end = add_work_days(query.start, query.days, state.settings.weekend)?;
    Ok(Json(WorkdaysResponse {
        start: query.start,
        days: query.days,
        end,
    }))
}

fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn etag(version: &str) -> String {
    format!("\"{version}\"")
}

/// Version named by `If-Match`, if any. `*` matches anything.
fn if_match(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::IF_MATCH)?.to_str().ok()?.trim();
    let value = value.strip_prefix("W/").unwrap_or(value).trim_matches('"');
    (!value.is_empty() && value != "*").then(|| value.to_string())
}
