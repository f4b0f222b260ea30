//! Session identity and extraction helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Access level of a logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May read and save the configuration.
    Admin,
    /// May only read.
    Viewer,
}

impl Role {
    /// Lowercase name, as shown to users.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is making a request.
///
/// Stored in HTTP request extensions by the session middleware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    /// No session, or a session without a login.
    #[default]
    Anonymous,
    /// A successful login.
    Authenticated {
        /// Name the user logged in with.
        username: String,
        /// Role granted at login.
        role: Role,
    },
}

impl Identity {
    /// Shorthand for an authenticated identity.
    pub fn authenticated(username: impl Into<String>, role: Role) -> Self {
        Identity::Authenticated {
            username: username.into(),
            role,
        }
    }

    /// Role, if authenticated.
    pub fn role(&self) -> Option<Role> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated { role, .. } => Some(*role),
        }
    }

    /// Username, if authenticated.
    pub fn username(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated { username, .. } => Some(username),
        }
    }

    /// Whether this identity carries the admin role.
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

/// Extract the [`Identity`] from HTTP request `Parts`.
///
/// Returns [`Identity::Anonymous`] if the session middleware did not run.
pub fn identity_from_parts(parts: &http::request::Parts) -> Identity {
    parts
        .extensions
        .get::<Identity>()
        .cloned()
        .unwrap_or_default()
}
