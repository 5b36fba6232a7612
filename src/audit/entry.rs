//! History entry data structures
//!
//! One `HistoryEntry` records one field of one record changing from one
//! string value to another. Entries are append-only; they disappear only
//! when the record that owns them is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{HistoryId, UserId};

/// Types of records whose updates are tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Defect,
    Project,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Defect => write!(f, "Defect"),
            EntityType::Project => write!(f, "Project"),
        }
    }
}

/// A single field-level change to an auditable record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier of the entry
    pub id: HistoryId,

    /// Kind of record the entry belongs to
    pub entity_type: EntityType,

    /// Full key of the owning record
    pub record_id: String,

    /// User who made the change
    pub user_id: UserId,

    /// Serialized name of the changed field
    pub field_name: String,

    /// Stringified value before the change
    pub old_value: String,

    /// Stringified value after the change
    pub new_value: String,

    /// When the change was made
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Whether this entry belongs to the given record
    pub fn belongs_to(&self, entity_type: EntityType, record_id: &str) -> bool {
        self.entity_type == entity_type && self.record_id == record_id
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let show = |v: &str| {
            if v.is_empty() {
                "(empty)".to_string()
            } else {
                format!("\"{}\"", v)
            }
        };
        format!(
            "[{}] {}: {} -> {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.field_name,
            show(&self.old_value),
            show(&self.new_value),
        )
    }
}
