//! Service layer for the defect tracker
//!
//! The service layer provides business logic on top of the storage layer:
//! permission checks against the caller's `AuthContext`, validation,
//! change history, and cascades across entities.

pub mod auth;
pub mod defect;
pub mod project;

pub use auth::{AuthService, ProfileUpdate};
pub use defect::{DefectDeletion, DefectService, DefectStatistics, NewDefect};
pub use project::{ProjectDeletion, ProjectService};
