//! Extractors that guard handlers by role.
//!
//! Both read the [`Identity`] placed in request extensions by
//! [`SessionLayer`](crate::SessionLayer).

use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::{AuthError, Identity, Role, identity_from_parts, require_role};

/// Any logged-in user. Rejects anonymous requests with a redirect to the
/// login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Login name.
    pub username: String,
    /// Granted role.
    pub role: Role,
}

impl CurrentUser {
    /// Whether the user may save.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match identity_from_parts(parts) {
            Identity::Authenticated { username, role } => Ok(CurrentUser { username, role }),
            Identity::Anonymous => Err(AuthError::Unauthenticated),
        }
    }
}

/// A logged-in administrator. Viewers are rejected with `403 Forbidden`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    /// Login name.
    pub username: String,
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = identity_from_parts(parts);
        require_role(&identity, Role::Admin)?;
        Ok(AdminUser {
            username: identity.username().unwrap_or_default().to_string(),
        })
    }
}
