//! Authentication context passed into every service call
//!
//! Holds the signed-in user, if any. Services never look the session up on
//! their own; the caller resolves it once (see `AuthService::current`) and
//! threads it through.

use crate::error::{TrackerError, TrackerResult};
use crate::models::{Permission, Role, UserId, UserProfile};

use super::policy;

/// Who is acting, as far as the application knows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    user: Option<UserProfile>,
}

impl AuthContext {
    /// Context for a signed-in user
    pub fn signed_in(user: UserProfile) -> Self {
        Self { user: Some(user) }
    }

    /// Context with nobody signed in
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }

    /// Effective role; `None` when signed out
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    /// Permission check that never errors
    pub fn can(&self, permission: Permission) -> bool {
        policy::has_permission(self.role(), permission)
    }

    /// The signed-in user, or `Unauthenticated`
    pub fn require_user(&self) -> TrackerResult<&UserProfile> {
        self.user.as_ref().ok_or(TrackerError::Unauthenticated)
    }

    /// The signed-in user if their role grants `permission`
    pub fn require(&self, permission: Permission) -> TrackerResult<&UserProfile> {
        let user = self.require_user()?;
        if policy::has_permission(Some(user.role), permission) {
            Ok(user)
        } else {
            tracing::debug!(user = %user.id, %permission, "permission denied");
            Err(TrackerError::Forbidden { permission })
        }
    }
}
