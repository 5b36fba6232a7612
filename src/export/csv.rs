//! CSV Export functionality
//!
//! Flat defect listing for spreadsheets. Project and user ids are resolved
//! to names so the file reads on its own.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::access::AuthContext;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{DefectFilter, Permission, UserId};
use crate::services::DefectService;
use crate::storage::Storage;

#[derive(Serialize)]
struct DefectRow<'a> {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Project")]
    project: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Priority")]
    priority: &'static str,
    #[serde(rename = "Assigned To")]
    assigned_to: &'a str,
    #[serde(rename = "Reported By")]
    reported_by: &'a str,
    #[serde(rename = "Due Date")]
    due_date: String,
    #[serde(rename = "Created")]
    created_at: String,
    #[serde(rename = "Updated")]
    updated_at: String,
    #[serde(rename = "Description")]
    description: &'a str,
}

/// Export defects matching `filter` to CSV, newest first
pub fn export_defects_csv<W: Write>(
    storage: &Storage,
    ctx: &AuthContext,
    filter: &DefectFilter,
    writer: W,
) -> TrackerResult<usize> {
    ctx.require(Permission::ExportData)?;
    let defects = DefectService::new(storage).list(ctx, filter)?;

    let project_names: HashMap<_, _> = storage
        .projects
        .all()?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    let user_names: HashMap<_, _> = storage
        .users
        .all()?
        .into_iter()
        .map(|u| (u.id, u.full_name))
        .collect();
    let user_name = |id: Option<UserId>| {
        id.and_then(|id| user_names.get(&id))
            .map(String::as_str)
            .unwrap_or("")
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    for defect in &defects {
        let row = DefectRow {
            id: defect.id.key(),
            project: project_names
                .get(&defect.project_id)
                .map(String::as_str)
                .unwrap_or("Unknown"),
            title: &defect.title,
            status: defect.status.as_str(),
            priority: defect.priority.as_str(),
            assigned_to: user_name(defect.assigned_to),
            reported_by: user_name(defect.reported_by),
            due_date: defect.due_date.map(|d| d.to_string()).unwrap_or_default(),
            created_at: defect.created_at.to_rfc3339(),
            updated_at: defect.updated_at.to_rfc3339(),
            description: &defect.description,
        };
        csv_writer
            .serialize(row)
            .map_err(|e| TrackerError::Export(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| TrackerError::Export(e.to_string()))?;

    Ok(defects.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::{seeded_storage, signed_in};
    use crate::models::Role;

    #[test]
    fn test_defects_csv() {
        let storage = seeded_storage();
        let admin = signed_in(&storage, Role::Admin);

        let mut output = Vec::new();
        let count =
            export_defects_csv(&storage, &admin, &DefectFilter::default(), &mut output).unwrap();
        assert_eq!(count, 2);

        let mut reader = csv::Reader::from_reader(output.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "ID");
        assert_eq!(&headers[1], "Project");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| &r[1] == "Harbor"));
        // Commas in titles survive quoting
        assert!(rows.iter().any(|r| &r[2] == "Leak, east stairwell"));
    }

    #[test]
    fn test_csv_needs_export_permission() {
        let storage = seeded_storage();
        let engineer = signed_in(&storage, Role::Engineer);
        let err = export_defects_csv(&storage, &engineer, &DefectFilter::default(), Vec::<u8>::new())
            .unwrap_err();
        assert!(err.is_forbidden());
    }
}
