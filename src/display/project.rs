//! Project display formatting
//!
//! Formats projects for terminal output in table and detail views.

use tabled::{settings::Style, Table, Tabled};

use crate::models::Project;

use super::format_timestamp;

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
}

/// Format a list of projects as a table
pub fn format_project_list(projects: &[Project], date_format: &str) -> String {
    if projects.is_empty() {
        return "No projects found.".to_string();
    }

    let rows = projects.iter().map(|p| ProjectRow {
        id: p.id.to_string(),
        name: p.name.clone(),
        status: p.status.to_string(),
        created: format_timestamp(&p.created_at, date_format),
    });

    Table::new(rows).with(Style::modern()).to_string()
}

/// Format a single project's details
pub fn format_project_details(project: &Project, defect_count: usize, date_format: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Project: {}\n", project.name));
    output.push_str(&format!("  ID:          {}\n", project.id));
    output.push_str(&format!("  Status:      {}\n", project.status));
    output.push_str(&format!("  Defects:     {}\n", defect_count));
    output.push_str(&format!(
        "  Created:     {}\n",
        format_timestamp(&project.created_at, date_format)
    ));
    output.push_str(&format!(
        "  Updated:     {}\n",
        format_timestamp(&project.updated_at, date_format)
    ));
    if !project.description.is_empty() {
        output.push_str(&format!("\n{}\n", project.description));
    }

    output
}
