//! Defect model
//!
//! A defect is filed against a project, moves through a small status
//! workflow, and may be assigned to a user. Edits go through `DefectUpdate`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::ids::{DefectId, ProjectId, UserId};
use crate::audit::FieldUpdates;

/// Workflow status of a defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectStatus {
    New,
    Open,
    InProgress,
    Resolved,
    Closed,
    Reopened,
}

impl DefectStatus {
    pub const ALL: [DefectStatus; 6] = [
        DefectStatus::New,
        DefectStatus::Open,
        DefectStatus::InProgress,
        DefectStatus::Resolved,
        DefectStatus::Closed,
        DefectStatus::Reopened,
    ];

    /// Stable storage value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
        }
    }

    /// Parse defect status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Some(Self::New),
            "open" => Some(Self::Open),
            "in_progress" | "in-progress" | "inprogress" | "wip" => Some(Self::InProgress),
            "resolved" | "fixed" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            "reopened" => Some(Self::Reopened),
            _ => None,
        }
    }

    /// Whether work on the defect is finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl Default for DefectStatus {
    fn default() -> Self {
        Self::New
    }
}

impl fmt::Display for DefectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "New"),
            Self::Open => write!(f, "Open"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Closed => write!(f, "Closed"),
            Self::Reopened => write!(f, "Reopened"),
        }
    }
}

/// Urgency of a defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl DefectPriority {
    pub const ALL: [DefectPriority; 4] = [
        DefectPriority::Low,
        DefectPriority::Medium,
        DefectPriority::High,
        DefectPriority::Critical,
    ];

    /// Stable storage value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse priority from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "normal" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "urgent" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl Default for DefectPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for DefectPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// A defect filed against a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defect {
    /// Unique identifier
    pub id: DefectId,

    /// Owning project
    pub project_id: ProjectId,

    /// Short summary
    pub title: String,

    /// Detailed description
    #[serde(default)]
    pub description: String,

    /// Workflow status
    #[serde(default)]
    pub status: DefectStatus,

    /// Urgency
    #[serde(default)]
    pub priority: DefectPriority,

    /// User currently responsible for the defect
    #[serde(default)]
    pub assigned_to: Option<UserId>,

    /// User who filed the defect
    #[serde(default)]
    pub reported_by: Option<UserId>,

    /// Target date for resolution
    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    /// When the defect was filed
    pub created_at: DateTime<Utc>,

    /// When the defect was last modified
    pub updated_at: DateTime<Utc>,
}

impl Defect {
    /// Create a new defect with default status and priority
    pub fn new(project_id: ProjectId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: DefectId::new(),
            project_id,
            title: title.into(),
            description: String::new(),
            status: DefectStatus::default(),
            priority: DefectPriority::default(),
            assigned_to: None,
            reported_by: None,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an update into this defect, touching `updated_at`
    pub fn apply(&mut self, update: &DefectUpdate, now: DateTime<Utc>) {
        if let Some(project_id) = update.project_id {
            self.project_id = project_id;
        }
        if let Some(title) = &update.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(assigned_to) = update.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        self.updated_at = now;
    }

    /// Whether the defect is past its due date and still being worked
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.due_date.map_or(false, |due| due < today)
    }

    /// Validate the defect
    pub fn validate(&self) -> Result<(), DefectValidationError> {
        if self.title.trim().is_empty() {
            return Err(DefectValidationError::EmptyTitle);
        }

        let title_len = self.title.chars().count();
        if title_len > 200 {
            return Err(DefectValidationError::TitleTooLong(title_len));
        }

        Ok(())
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.title)
    }
}

/// Fields of a defect a caller may change
///
/// The nested options on `assigned_to` and `due_date` distinguish "leave
/// alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefectUpdate {
    pub project_id: Option<ProjectId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<DefectStatus>,
    pub priority: Option<DefectPriority>,
    pub assigned_to: Option<Option<UserId>>,
    pub due_date: Option<Option<NaiveDate>>,
}

impl DefectUpdate {
    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether this update changes the assignee field at all
    pub fn touches_assignee(&self) -> bool {
        self.assigned_to.is_some()
    }

    /// The set fields, in schema order, keyed by their serialized names
    pub fn field_updates(&self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        if let Some(project_id) = self.project_id {
            updates.set("project_id", Value::String(project_id.key()));
        }
        if let Some(title) = &self.title {
            updates.set("title", Value::String(title.trim().to_string()));
        }
        if let Some(description) = &self.description {
            updates.set("description", Value::String(description.clone()));
        }
        if let Some(status) = self.status {
            updates.set("status", Value::String(status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            updates.set("priority", Value::String(priority.as_str().to_string()));
        }
        if let Some(assigned_to) = self.assigned_to {
            updates.set(
                "assigned_to",
                assigned_to.map_or(Value::Null, |id| Value::String(id.key())),
            );
        }
        if let Some(due_date) = self.due_date {
            updates.set(
                "due_date",
                due_date.map_or(Value::Null, |d| Value::String(d.to_string())),
            );
        }
        updates
    }
}

/// Criteria for listing defects; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct DefectFilter {
    pub project_id: Option<ProjectId>,
    pub status: Option<DefectStatus>,
    pub priority: Option<DefectPriority>,
    pub assigned_to: Option<UserId>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

impl DefectFilter {
    /// Whether a defect satisfies every set criterion
    pub fn matches(&self, defect: &Defect) -> bool {
        if self.project_id.map_or(false, |id| id != defect.project_id) {
            return false;
        }
        if self.status.map_or(false, |s| s != defect.status) {
            return false;
        }
        if self.priority.map_or(false, |p| p != defect.priority) {
            return false;
        }
        if self.assigned_to.is_some() && self.assigned_to != defect.assigned_to {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return defect.title.to_lowercase().contains(&needle)
                || defect.description.to_lowercase().contains(&needle);
        }
        true
    }
}

/// Validation errors for defects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefectValidationError {
    EmptyTitle,
    TitleTooLong(usize),
}

impl fmt::Display for DefectValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Defect title cannot be empty"),
            Self::TitleTooLong(len) => write!(f, "Defect title too long ({} chars, max 200)", len),
        }
    }
}

impl std::error::Error for DefectValidationError {}
