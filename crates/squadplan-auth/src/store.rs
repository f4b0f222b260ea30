//! Session storage.
//!
//! The browser holds only an opaque token in a signed cookie; the identity
//! behind it lives in a [`SessionStore`].

use std::sync::RwLock;

use indexmap::IndexMap;

use crate::Identity;

/// Storage for session identities keyed by token.
///
/// Implement this for any backing store. Unknown tokens resolve to
/// [`Identity::Anonymous`].
pub trait SessionStore: Send + Sync + 'static {
    /// Identity recorded for `token`.
    fn get(&self, token: &str) -> Identity;

    /// Record `identity` for `token`, replacing any previous value.
    fn set(&self, token: &str, identity: Identity);

    /// Forget `token`. Clearing an unknown token is a no-op.
    fn clear(&self, token: &str);
}

/// Sessions a [`MemorySessionStore`] keeps by default.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Process-local session store.
///
/// Sessions live until logout or restart. Once `max_sessions` are held, each
/// new session evicts the oldest one.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: RwLock<IndexMap<String, Identity>>,
    max_sessions: usize,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }
}

impl MemorySessionStore {
    /// Create an empty store holding at most [`DEFAULT_MAX_SESSIONS`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding at most `max_sessions` (minimum 1).
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(IndexMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Whether there are no live sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, token: &str) -> Identity {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(token)
            .cloned()
            .unwrap_or_default()
    }

    fn set(&self, token: &str, identity: Identity) {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.insert(token.to_string(), identity);
        let excess = sessions.len().saturating_sub(self.max_sessions);
        if excess > 0 {
            sessions.drain(..excess);
            log::debug!("Evicted {excess} oldest session(s)");
        }
    }

    fn clear(&self, token: &str) {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .shift_remove(token);
    }
}

/// Generate a fresh random session token.
pub fn new_session_token() -> String {
    uuid::Uuid::new_v4().to_string()
}
