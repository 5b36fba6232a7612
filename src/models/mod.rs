//! Core data models for the defect tracker
//!
//! Users and their roles, the permission tokens roles grant, and the tracked
//! entities: projects, defects and comments. Change-history entries live in
//! `crate::audit`.

pub mod comment;
pub mod defect;
pub mod ids;
pub mod project;
pub mod role;
pub mod user;

pub use comment::Comment;
pub use defect::{Defect, DefectFilter, DefectPriority, DefectStatus, DefectUpdate};
pub use ids::{CommentId, DefectId, HistoryId, ProjectId, UserId};
pub use project::{Project, ProjectStatus, ProjectUpdate};
pub use role::{Permission, Role};
pub use user::{User, UserProfile};
