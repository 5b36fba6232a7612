//! Custom error types for the defect tracker
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::Permission;

/// The main error type for defect tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// No user is signed in
    #[error("Not signed in")]
    Unauthenticated,

    /// The signed-in user's role lacks a permission
    #[error("Permission denied: {permission}")]
    Forbidden { permission: Permission },

    /// Sign-in failed
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A history entry would have been written without an actor or record id
    #[error("Missing attribution for history entry: no {missing}")]
    MissingAttribution { missing: &'static str },

    /// Password hashing or prompting failures
    #[error("Password error: {0}")]
    Password(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl TrackerError {
    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for projects
    pub fn project_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Project",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for defects
    pub fn defect_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Defect",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for comments
    pub fn comment_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Comment",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an authorization failure
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for defect tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
