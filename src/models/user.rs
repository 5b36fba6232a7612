//! User model
//!
//! `User` is the stored record including the password hash. Everything
//! outside the user store works with `UserProfile`, which never carries it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;
use super::role::Role;

/// A stored user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Sign-in email, stored lowercased
    pub email: String,

    /// Argon2id PHC string
    pub password_hash: String,

    /// Display name
    pub full_name: String,

    /// Assigned role
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last modified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new user from an already-hashed password
    pub fn new(
        email: &str,
        password_hash: String,
        full_name: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email: Self::normalize_email(email),
            password_hash,
            full_name: full_name.into(),
            role,
            created_at: now,
            updated_at: None,
        }
    }

    /// Normalize an email for storage and lookup
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Password-free projection of this user
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Validate the user
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }

        if !self.email.contains('@') {
            return Err(UserValidationError::InvalidEmail(self.email.clone()));
        }

        if self.full_name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }

        let name_len = self.full_name.chars().count();
        if name_len > 100 {
            return Err(UserValidationError::NameTooLong(name_len));
        }

        Ok(())
    }
}

/// A user as seen by the rest of the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.full_name, self.email)
    }
}

/// Validation errors for users
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    InvalidEmail(String),
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "Email cannot be empty"),
            Self::InvalidEmail(email) => write!(f, "Invalid email address: '{}'", email),
            Self::EmptyName => write!(f, "Full name cannot be empty"),
            Self::NameTooLong(len) => write!(f, "Full name too long ({} chars, max 100)", len),
        }
    }
}

impl std::error::Error for UserValidationError {}
