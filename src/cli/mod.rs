//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod comment;
pub mod defect;
pub mod export;
pub mod project;
pub mod user;

pub use comment::{handle_comment_command, CommentCommands};
pub use defect::{handle_defect_command, DefectCommands};
pub use export::{handle_export_command, ExportCommands, ExportFormat};
pub use project::{handle_project_command, ProjectCommands};
pub use user::{handle_user_command, UserCommands};

use chrono::NaiveDate;

use crate::display::UserNames;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{DefectPriority, DefectStatus, ProjectStatus, Role};
use crate::storage::Storage;

pub(crate) fn parse_role(s: &str) -> TrackerResult<Role> {
    s.parse()
}

pub(crate) fn parse_defect_status(s: &str) -> TrackerResult<DefectStatus> {
    DefectStatus::parse(s).ok_or_else(|| {
        TrackerError::Validation(format!(
            "Invalid status: '{}'. Valid: new, open, in_progress, resolved, closed, reopened",
            s
        ))
    })
}

pub(crate) fn parse_priority(s: &str) -> TrackerResult<DefectPriority> {
    DefectPriority::parse(s).ok_or_else(|| {
        TrackerError::Validation(format!(
            "Invalid priority: '{}'. Valid: low, medium, high, critical",
            s
        ))
    })
}

pub(crate) fn parse_project_status(s: &str) -> TrackerResult<ProjectStatus> {
    ProjectStatus::parse(s).ok_or_else(|| {
        TrackerError::Validation(format!(
            "Invalid project status: '{}'. Valid: active, on_hold, completed, archived",
            s
        ))
    })
}

pub(crate) fn parse_date(s: &str) -> TrackerResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        TrackerError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", s))
    })
}

/// Display names for every user, keyed by id
pub(crate) fn user_names(storage: &Storage) -> TrackerResult<UserNames> {
    Ok(storage
        .users
        .all()?
        .into_iter()
        .map(|u| (u.id, u.full_name))
        .collect())
}
