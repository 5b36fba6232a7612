//! Display formatting for terminal output
//!
//! List views render as `tabled` tables; detail views are plain indented
//! text.

pub mod defect;
pub mod project;
pub mod user;

pub use defect::{
    format_comment, format_defect_details, format_defect_list, format_history, format_statistics,
    UserNames,
};
pub use project::{format_project_details, format_project_list};
pub use user::{format_role_matrix, format_user_list, format_whoami};

use chrono::{DateTime, Utc};

use crate::config::settings::{is_valid_date_format, DEFAULT_DATE_FORMAT};

/// Render a timestamp, falling back to the default pattern if `format`
/// is not valid strftime
pub fn format_timestamp(at: &DateTime<Utc>, format: &str) -> String {
    if is_valid_date_format(format) {
        at.format(format).to_string()
    } else {
        at.format(DEFAULT_DATE_FORMAT).to_string()
    }
}
