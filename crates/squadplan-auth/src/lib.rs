//! Two-role session authentication for SquadPlan.
//!
//! Provides:
//! - [`Identity`] / [`Role`] - who is making a request
//! - [`Authenticator`] - credential check, identity resolution, role checks
//! - [`SessionStore`] - trait for token → identity storage, with [`MemorySessionStore`]
//! - [`SessionLayer`] / [`SessionService`] - Tower middleware resolving the session cookie
//! - [`CurrentUser`] / [`AdminUser`] - axum extractors guarding handlers
//! - [`AuthError`] - auth-specific error types

mod error;
mod guard;
mod identity;
mod middleware;
mod store;

use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use sha2::{Digest, Sha512};

pub use error::{AuthError, LOGIN_PATH};
pub use guard::{AdminUser, CurrentUser};
pub use identity::{Identity, Role, identity_from_parts};
pub use middleware::{SessionLayer, SessionService};
pub use store::{DEFAULT_MAX_SESSIONS, MemorySessionStore, SessionStore, new_session_token};

/// Name of the signed cookie carrying the session token.
pub const SESSION_COOKIE: &str = "squadplan_session";

/// A username/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plain-text password, compared verbatim.
    pub password: String,
}

impl Credentials {
    /// Create a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for authentication.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// When true, every request is treated as the administrator.
    pub bypass: bool,
    /// Account granted [`Role::Admin`].
    pub admin: Credentials,
    /// Account granted [`Role::Viewer`].
    pub viewer: Credentials,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bypass: true,
            admin: Credentials::new("admin", "admin123"),
            viewer: Credentials::new("viewer", "viewer123"),
        }
    }
}

/// Checks credentials and roles against an [`AuthConfig`].
#[derive(Clone, Debug)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    /// Create an authenticator for `config`.
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Whether the bypass flag is set.
    pub fn bypass(&self) -> bool {
        self.config.bypass
    }

    /// Effective identity for a request whose session recorded `session`.
    ///
    /// Under bypass this is the administrator; otherwise the session
    /// identity if [`identify`](Self::identify) grants it a role, and
    /// anonymous if not.
    pub fn resolve(&self, session: Identity) -> Identity {
        match self.identify(&session) {
            Ok(role) if self.config.bypass => {
                Identity::authenticated(self.config.admin.username.clone(), role)
            }
            Ok(_) => session,
            Err(_) => Identity::Anonymous,
        }
    }

    /// Role of the identity recorded in a session.
    ///
    /// Under bypass this is always [`Role::Admin`] and the session is not
    /// consulted.
    pub fn identify(&self, session: &Identity) -> Result<Role, AuthError> {
        if self.config.bypass {
            return Ok(Role::Admin);
        }
        session.role().ok_or(AuthError::Unauthenticated)
    }

    /// Check a login form submission.
    ///
    /// Under bypass any submission succeeds as admin, keeping the submitted
    /// username (or the admin username if it was empty). Otherwise the admin
    /// pair is checked before the viewer pair.
    pub fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        if self.config.bypass {
            let username = if username.is_empty() {
                self.config.admin.username.as_str()
            } else {
                username
            };
            return Ok(Identity::authenticated(username, Role::Admin));
        }
        if self.config.admin.matches(username, password) {
            return Ok(Identity::authenticated(username, Role::Admin));
        }
        if self.config.viewer.matches(username, password) {
            return Ok(Identity::authenticated(username, Role::Viewer));
        }
        log::info!("Rejected login for user {username:?}");
        Err(AuthError::Rejected)
    }
}

/// Require that `identity` holds exactly `role`.
pub fn require_role(identity: &Identity, role: Role) -> Result<(), AuthError> {
    match identity.role() {
        None => Err(AuthError::Unauthenticated),
        Some(actual) if actual == role => Ok(()),
        Some(_) => Err(AuthError::Forbidden { required: role }),
    }
}

/// Derive the cookie signing key from a secret of any length.
pub fn session_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie value that, when removed from a jar, clears the session cookie.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}
