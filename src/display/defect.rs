//! Defect display formatting
//!
//! Table and detail views for defects, their comments and history, plus
//! the statistics summary.

use std::collections::HashMap;

use chrono::NaiveDate;
use tabled::{settings::Style, Table, Tabled};

use crate::audit::HistoryEntry;
use crate::models::{Comment, Defect, DefectPriority, DefectStatus, UserId};
use crate::services::DefectStatistics;

use super::format_timestamp;

/// Resolves user ids to display names
pub type UserNames = HashMap<UserId, String>;

fn name_of(names: &UserNames, id: Option<UserId>) -> String {
    match id {
        Some(id) => names.get(&id).cloned().unwrap_or_else(|| id.to_string()),
        None => "-".to_string(),
    }
}

#[derive(Tabled)]
struct DefectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Due")]
    due: String,
}

/// Format a list of defects as a table
///
/// Overdue due dates are marked with `!`.
pub fn format_defect_list(defects: &[Defect], names: &UserNames, today: NaiveDate) -> String {
    if defects.is_empty() {
        return "No defects found.".to_string();
    }

    let rows = defects.iter().map(|d| DefectRow {
        id: d.id.to_string(),
        title: d.title.clone(),
        status: d.status.to_string(),
        priority: d.priority.to_string(),
        assignee: name_of(names, d.assigned_to),
        due: match d.due_date {
            Some(due) if d.is_overdue(today) => format!("{} !", due),
            Some(due) => due.to_string(),
            None => String::new(),
        },
    });

    Table::new(rows).with(Style::modern()).to_string()
}

/// Format a single defect with its comments
pub fn format_defect_details(
    defect: &Defect,
    project_name: &str,
    comments: &[Comment],
    names: &UserNames,
    date_format: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Defect: {}\n", defect.title));
    output.push_str(&format!("  ID:          {}\n", defect.id));
    output.push_str(&format!("  Project:     {}\n", project_name));
    output.push_str(&format!("  Status:      {}\n", defect.status));
    output.push_str(&format!("  Priority:    {}\n", defect.priority));
    output.push_str(&format!(
        "  Assignee:    {}\n",
        name_of(names, defect.assigned_to)
    ));
    output.push_str(&format!(
        "  Reporter:    {}\n",
        name_of(names, defect.reported_by)
    ));
    if let Some(due) = defect.due_date {
        output.push_str(&format!("  Due:         {}\n", due));
    }
    output.push_str(&format!(
        "  Created:     {}\n",
        format_timestamp(&defect.created_at, date_format)
    ));
    output.push_str(&format!(
        "  Updated:     {}\n",
        format_timestamp(&defect.updated_at, date_format)
    ));

    if !defect.description.is_empty() {
        output.push_str(&format!("\n{}\n", defect.description));
    }

    if !comments.is_empty() {
        output.push_str(&format!("\nComments ({}):\n", comments.len()));
        for comment in comments {
            output.push_str(&format_comment(comment, names, date_format));
        }
    }

    output
}

/// Format one comment as an indented block
pub fn format_comment(comment: &Comment, names: &UserNames, date_format: &str) -> String {
    format!(
        "  [{}] {} ({}):\n    {}\n",
        comment.id,
        name_of(names, Some(comment.user_id)),
        format_timestamp(&comment.created_at, date_format),
        comment.content.replace('\n', "\n    ")
    )
}

/// Format a change history, one line per entry
pub fn format_history(entries: &[HistoryEntry], names: &UserNames) -> String {
    if entries.is_empty() {
        return "No changes recorded.".to_string();
    }

    entries
        .iter()
        .map(|e| format!("{} by {}\n", e.format_human_readable(), name_of(names, Some(e.user_id))))
        .collect()
}

/// Format defect statistics
pub fn format_statistics(stats: &DefectStatistics) -> String {
    let mut output = String::new();

    output.push_str(&format!("Total defects: {}\n", stats.total));
    output.push_str(&format!("Overdue:       {}\n", stats.overdue));

    output.push_str("\nBy status:\n");
    for status in DefectStatus::ALL {
        let count = stats.by_status.get(&status).copied().unwrap_or(0);
        output.push_str(&format!("  {:<12} {:>5}\n", status.to_string(), count));
    }

    output.push_str("\nBy priority:\n");
    for priority in DefectPriority::ALL {
        let count = stats.by_priority.get(&priority).copied().unwrap_or(0);
        output.push_str(&format!("  {:<12} {:>5}\n", priority.to_string(), count));
    }

    output
}
