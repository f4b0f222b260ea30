//! Shared application state.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use squadplan_auth::{Authenticator, MemorySessionStore, session_key};
use tokio::sync::Mutex;

use crate::config::Settings;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Immutable settings.
    pub settings: Arc<Settings>,
    /// Credential and role checks.
    pub authenticator: Arc<Authenticator>,
    /// Session identities by token.
    pub sessions: Arc<MemorySessionStore>,
    /// Cookie signing key.
    pub key: Key,
    /// Serialises saves within this process.
    pub save_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Build state from settings.
    pub fn new(settings: Settings) -> Self {
        let key = session_key(&settings.secret_key);
        let authenticator = Authenticator::new(settings.auth.clone());
        Self {
            settings: Arc::new(settings),
            authenticator: Arc::new(authenticator),
            sessions: Arc::new(MemorySessionStore::new()),
            key,
            save_lock: Arc::new(Mutex::new(())),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
