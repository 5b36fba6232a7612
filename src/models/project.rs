//! Project model
//!
//! Projects group defects. A project is an auditable record: edits go
//! through `ProjectUpdate` so the change history sees only the fields that
//! were actually set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::ids::{ProjectId, UserId};
use crate::audit::FieldUpdates;

/// Lifecycle state of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    OnHold,
    Completed,
    Archived,
}

impl ProjectStatus {
    /// Stable storage value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }

    /// Parse project status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "on_hold" | "onhold" | "on-hold" | "hold" => Some(Self::OnHold),
            "completed" | "done" => Some(Self::Completed),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::OnHold => write!(f, "On Hold"),
            Self::Completed => write!(f, "Completed"),
            Self::Archived => write!(f, "Archived"),
        }
    }
}

/// A project that defects are filed against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Project name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: ProjectStatus,

    /// User who created the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last modified
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new active project
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description: String::new(),
            status: ProjectStatus::default(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an update into this project, touching `updated_at`
    pub fn apply(&mut self, update: &ProjectUpdate, now: DateTime<Utc>) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = now;
    }

    /// Validate the project
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        if self.name.trim().is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }

        let name_len = self.name.chars().count();
        if name_len > 200 {
            return Err(ProjectValidationError::NameTooLong(name_len));
        }

        Ok(())
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Fields of a project a caller may change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectUpdate {
    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }

    /// The set fields, in schema order, keyed by their serialized names
    pub fn field_updates(&self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        if let Some(name) = &self.name {
            updates.set("name", Value::String(name.trim().to_string()));
        }
        if let Some(description) = &self.description {
            updates.set("description", Value::String(description.clone()));
        }
        if let Some(status) = self.status {
            updates.set("status", Value::String(status.as_str().to_string()));
        }
        updates
    }
}

/// Validation errors for projects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for ProjectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Project name cannot be empty"),
            Self::NameTooLong(len) => write!(f, "Project name too long ({} chars, max 200)", len),
        }
    }
}

impl std::error::Error for ProjectValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_defaults_to_active() {
        let project = Project::new("Riverside Tower", Utc::now());
        assert_eq!(project.status, ProjectStatus::Active);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_status_parse_and_serde_agree() {
        for status in [
            ProjectStatus::Active,
            ProjectStatus::OnHold,
            ProjectStatus::Completed,
            ProjectStatus::Archived,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_apply_only_touches_set_fields() {
        let created = Utc::now();
        let mut project = Project::new("Depot", created);
        project.description = "Bus depot renovation".into();

        let update = ProjectUpdate {
            status: Some(ProjectStatus::OnHold),
            ..Default::default()
        };
        let later = created + chrono::Duration::minutes(5);
        project.apply(&update, later);

        assert_eq!(project.name, "Depot");
        assert_eq!(project.description, "Bus depot renovation");
        assert_eq!(project.status, ProjectStatus::OnHold);
        assert_eq!(project.updated_at, later);
    }

    #[test]
    fn test_field_updates_follow_schema_order() {
        let update = ProjectUpdate {
            status: Some(ProjectStatus::Completed),
            name: Some("  Depot  ".into()),
            description: None,
        };
        let updates = update.field_updates();
        let keys: Vec<_> = updates.keys().collect();
        assert_eq!(keys, vec!["name", "status"]);
    }

    #[test]
    fn test_validation() {
        let mut project = Project::new("", Utc::now());
        assert_eq!(project.validate(), Err(ProjectValidationError::EmptyName));

        project.name = "x".repeat(201);
        assert!(matches!(
            project.validate(),
            Err(ProjectValidationError::NameTooLong(201))
        ));

        project.name = "Объект".repeat(33);
        assert!(project.validate().is_ok());
    }
}
