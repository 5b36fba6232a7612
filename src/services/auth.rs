//! Authentication service
//!
//! Sign-up, sign-in/out, and profile management. The signed-in user is
//! persisted through the session store; callers turn it into an
//! `AuthContext` with `current()` and pass that into every other service.

use crate::access::AuthContext;
use crate::config::Settings;
use crate::crypto::{hash_password, verify_password, HashParams};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Permission, Role, User, UserId, UserProfile};
use crate::storage::Storage;

/// Profile fields a user may change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    /// Changing a role needs `manage_users`, even for your own account
    pub role: Option<Role>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none() && self.role.is_none()
    }
}

/// Service for accounts and sessions
pub struct AuthService<'a> {
    storage: &'a Storage,
    min_password_length: usize,
    hash_params: HashParams,
}

impl<'a> AuthService<'a> {
    /// Create a new auth service
    pub fn new(storage: &'a Storage, settings: &Settings) -> Self {
        Self {
            storage,
            min_password_length: settings.min_password_length,
            hash_params: settings.password_hashing,
        }
    }

    /// Register a new account
    ///
    /// Emails are compared case-insensitively and stored lowercased.
    ///
    /// The role is taken as given, including `admin`, and no signed-in
    /// user is required. Anyone who can run sign-up against a data
    /// directory can therefore grant themselves every permission; later
    /// role changes go through `assign_role` and need `manage_users`.
    pub fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> TrackerResult<UserProfile> {
        let email = User::normalize_email(email);
        if self.find_by_email(&email)?.is_some() {
            return Err(TrackerError::Duplicate {
                entity_type: "User",
                identifier: email,
            });
        }

        self.check_password_length(password)?;

        let password_hash = hash_password(password, &self.hash_params)?;
        let user = User::new(&email, password_hash, full_name.trim(), role, self.storage.now());

        user.validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        self.storage.users.put(user.clone())?;
        tracing::info!(user = %user.id, role = %user.role, "user signed up");

        Ok(user.profile())
    }

    /// Check credentials and start a session
    pub fn sign_in(&self, email: &str, password: &str) -> TrackerResult<AuthContext> {
        let email = User::normalize_email(email);
        let user = match self.find_by_email(&email)? {
            Some(user) => user,
            None => {
                tracing::warn!("sign-in failed: unknown email");
                return Err(TrackerError::InvalidCredentials);
            }
        };
        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(user = %user.id, "sign-in failed: wrong password");
            return Err(TrackerError::InvalidCredentials);
        }

        let profile = user.profile();
        self.storage.session.set(profile.clone())?;
        tracing::info!(user = %user.id, "signed in");

        Ok(AuthContext::signed_in(profile))
    }

    /// End the current session
    pub fn sign_out(&self) -> TrackerResult<()> {
        if let Some(user) = self.storage.session.get()? {
            tracing::info!(user = %user.id, "signed out");
        }
        self.storage.session.clear()
    }

    /// Context for whoever is signed in
    ///
    /// The stored session is re-resolved against the user store, so role
    /// changes apply immediately and a deleted account acts as signed out.
    pub fn current(&self) -> TrackerResult<AuthContext> {
        let Some(session) = self.storage.session.get()? else {
            return Ok(AuthContext::anonymous());
        };

        match self.storage.users.get(session.id)? {
            Some(user) => Ok(AuthContext::signed_in(user.profile())),
            None => {
                tracing::warn!(user = %session.id, "session refers to a missing user");
                Ok(AuthContext::anonymous())
            }
        }
    }

    /// Update the signed-in user's own profile
    pub fn update_profile(
        &self,
        ctx: &AuthContext,
        update: &ProfileUpdate,
    ) -> TrackerResult<UserProfile> {
        let actor = ctx.require_user()?;
        if update.role.is_some() {
            ctx.require(Permission::ManageUsers)?;
        }
        self.apply_profile_update(actor.id, update)
    }

    /// Change another user's role
    pub fn assign_role(
        &self,
        ctx: &AuthContext,
        user_id: UserId,
        role: Role,
    ) -> TrackerResult<UserProfile> {
        ctx.require(Permission::ManageUsers)?;
        self.apply_profile_update(
            user_id,
            &ProfileUpdate {
                role: Some(role),
                ..ProfileUpdate::default()
            },
        )
    }

    /// Change the signed-in user's password
    pub fn change_password(
        &self,
        ctx: &AuthContext,
        old_password: &str,
        new_password: &str,
    ) -> TrackerResult<()> {
        let actor = ctx.require_user()?;
        self.check_password_length(new_password)?;

        let mut user = self
            .storage
            .users
            .get(actor.id)?
            .ok_or_else(|| TrackerError::user_not_found(actor.id.to_string()))?;

        if !verify_password(old_password, &user.password_hash)? {
            return Err(TrackerError::InvalidCredentials);
        }

        user.password_hash = hash_password(new_password, &self.hash_params)?;
        user.updated_at = Some(self.storage.now());
        self.storage.users.put(user)?;

        tracing::info!(user = %actor.id, "password changed");
        Ok(())
    }

    /// Every user, without password hashes
    pub fn list_users(&self, ctx: &AuthContext) -> TrackerResult<Vec<UserProfile>> {
        ctx.require_user()?;
        let mut users: Vec<UserProfile> = self
            .storage
            .users
            .all()?
            .iter()
            .map(User::profile)
            .collect();
        users.sort_by(|a, b| a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()));
        Ok(users)
    }

    /// Find a user by email or id
    pub fn find_user(&self, identifier: &str) -> TrackerResult<Option<UserProfile>> {
        if let Some(user) = self.find_by_email(&User::normalize_email(identifier))? {
            return Ok(Some(user.profile()));
        }

        let matches = self
            .storage
            .users
            .find(&|u: &User| u.id.matches(identifier))?;
        Ok(matches.first().map(User::profile))
    }

    /// Find a user by email or id, failing if absent
    pub fn resolve_user(&self, identifier: &str) -> TrackerResult<UserProfile> {
        self.find_user(identifier)?
            .ok_or_else(|| TrackerError::user_not_found(identifier))
    }

    fn find_by_email(&self, normalized: &str) -> TrackerResult<Option<User>> {
        Ok(self
            .storage
            .users
            .find(&|u: &User| u.email == normalized)?
            .into_iter()
            .next())
    }

    fn check_password_length(&self, password: &str) -> TrackerResult<()> {
        if password.chars().count() < self.min_password_length {
            return Err(TrackerError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        Ok(())
    }

    fn apply_profile_update(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> TrackerResult<UserProfile> {
        let mut user = self
            .storage
            .users
            .get(user_id)?
            .ok_or_else(|| TrackerError::user_not_found(user_id.to_string()))?;

        if update.is_empty() {
            return Ok(user.profile());
        }

        if let Some(email) = &update.email {
            let email = User::normalize_email(email);
            if let Some(other) = self.find_by_email(&email)? {
                if other.id != user.id {
                    return Err(TrackerError::Duplicate {
                        entity_type: "User",
                        identifier: email,
                    });
                }
            }
            user.email = email;
        }
        if let Some(full_name) = &update.full_name {
            user.full_name = full_name.trim().to_string();
        }
        if let Some(role) = update.role {
            if role != user.role {
                tracing::info!(user = %user.id, from = %user.role, to = %role, "role changed");
            }
            user.role = role;
        }
        user.updated_at = Some(self.storage.now());

        user.validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        self.storage.users.put(user.clone())?;

        let profile = user.profile();
        if self.storage.session.get()?.map(|s| s.id) == Some(user.id) {
            self.storage.session.set(profile.clone())?;
        }

        Ok(profile)
    }
}
