//! JSON Export functionality
//!
//! Exports the complete tracker database to JSON format with schema
//! versioning. Users are exported as profiles; password hashes never leave
//! the user store.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::AuthContext;
use crate::audit::{EntityType, HistoryEntry};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Comment, Defect, Permission, Project, User, UserProfile};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full database export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// Who ran the export
    pub exported_by: String,

    /// All users, without credentials
    pub users: Vec<UserProfile>,

    /// All projects
    pub projects: Vec<Project>,

    /// All defects
    pub defects: Vec<Defect>,

    /// All comments
    pub comments: Vec<Comment>,

    /// The complete change history
    pub history: Vec<HistoryEntry>,

    /// Export metadata
    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub user_count: usize,
    pub project_count: usize,
    pub defect_count: usize,
    pub comment_count: usize,
    pub history_count: usize,
}

impl FullExport {
    /// Snapshot every collection; needs `export_data`
    pub fn from_storage(storage: &Storage, ctx: &AuthContext) -> TrackerResult<Self> {
        let actor = ctx.require(Permission::ExportData)?;

        let users: Vec<UserProfile> = storage.users.all()?.iter().map(User::profile).collect();
        let projects = storage.projects.all()?;
        let defects = storage.defects.all()?;
        let comments = storage.comments.all()?;
        let history = storage.history.all()?;

        let metadata = ExportMetadata {
            user_count: users.len(),
            project_count: projects.len(),
            defect_count: defects.len(),
            comment_count: comments.len(),
            history_count: history.len(),
        };

        tracing::info!(
            user = %actor.id,
            defects = metadata.defect_count,
            history = metadata.history_count,
            "exporting data"
        );

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: storage.now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_by: actor.email.clone(),
            users,
            projects,
            defects,
            comments,
            history,
            metadata,
        })
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let project_ids: HashSet<_> = self.projects.iter().map(|p| p.id).collect();
        let defect_ids: HashSet<_> = self.defects.iter().map(|d| d.id).collect();
        let project_keys: HashSet<_> = self.projects.iter().map(|p| p.id.key()).collect();
        let defect_keys: HashSet<_> = self.defects.iter().map(|d| d.id.key()).collect();

        for defect in &self.defects {
            if !project_ids.contains(&defect.project_id) {
                return Err(format!(
                    "Defect {} references unknown project {}",
                    defect.id, defect.project_id
                ));
            }
        }

        for comment in &self.comments {
            if !defect_ids.contains(&comment.defect_id) {
                return Err(format!(
                    "Comment {} references unknown defect {}",
                    comment.id, comment.defect_id
                ));
            }
        }

        for entry in &self.history {
            let known = match entry.entity_type {
                EntityType::Defect => defect_keys.contains(&entry.record_id),
                EntityType::Project => project_keys.contains(&entry.record_id),
            };
            if !known {
                return Err(format!(
                    "History entry {} references unknown {} {}",
                    entry.id, entry.entity_type, entry.record_id
                ));
            }
        }

        Ok(())
    }
}

/// Export the full database to JSON
pub fn export_full_json<W: Write>(
    storage: &Storage,
    ctx: &AuthContext,
    writer: &mut W,
    pretty: bool,
) -> TrackerResult<()> {
    let export = FullExport::from_storage(storage, ctx)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| TrackerError::Export(e.to_string()))?;

    Ok(())
}

/// Read a JSON export back, checking its integrity
pub fn read_full_json(json_str: &str) -> TrackerResult<FullExport> {
    let export: FullExport = serde_json::from_str(json_str)
        .map_err(|e| TrackerError::Export(format!("Invalid export file: {}", e)))?;

    export.validate().map_err(TrackerError::Export)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{seeded_storage, signed_in};
    use crate::models::Role;

    #[test]
    fn test_full_export() {
        let storage = seeded_storage();
        let admin = signed_in(&storage, Role::Admin);

        let export = FullExport::from_storage(&storage, &admin).unwrap();

        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.projects.len(), 1);
        assert_eq!(export.defects.len(), 2);
        assert_eq!(export.comments.len(), 1);
        assert_eq!(export.history.len(), 1);
        assert_eq!(export.metadata.user_count, export.users.len());
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_export_needs_permission() {
        let storage = seeded_storage();
        let lead = signed_in(&storage, Role::TeamLead);
        assert!(FullExport::from_storage(&storage, &lead)
            .unwrap_err()
            .is_forbidden());
    }

    #[test]
    fn test_json_roundtrip_without_password_hashes() {
        let storage = seeded_storage();
        let manager = signed_in(&storage, Role::Manager);

        let mut output = Vec::new();
        export_full_json(&storage, &manager, &mut output, true).unwrap();
        let json = String::from_utf8(output).unwrap();
        assert!(!json.contains("password_hash"));

        let imported = read_full_json(&json).unwrap();
        assert_eq!(imported.defects.len(), 2);
        assert_eq!(imported.exported_by, "manager@example.com");
    }

    #[test]
    fn test_validate_catches_dangling_history() {
        let storage = seeded_storage();
        let admin = signed_in(&storage, Role::Admin);
        let mut export = FullExport::from_storage(&storage, &admin).unwrap();

        export.history[0].record_id = "gone".into();
        assert!(export.validate().unwrap_err().contains("unknown Defect"));
    }
}
