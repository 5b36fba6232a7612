//! User and role display formatting

use tabled::{settings::Style, Table, Tabled};

use crate::access::role_permissions;
use crate::models::{Role, UserProfile};

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
}

/// Format a list of users as a table
pub fn format_user_list(users: &[UserProfile]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let rows = users.iter().map(|u| UserRow {
        id: u.id.to_string(),
        name: u.full_name.clone(),
        email: u.email.clone(),
        role: u.role.display_name().to_string(),
    });

    Table::new(rows).with(Style::modern()).to_string()
}

/// Format the signed-in user and what their role allows
pub fn format_whoami(user: &UserProfile) -> String {
    let mut output = String::new();
    output.push_str(&format!("Signed in as {}\n", user));
    output.push_str(&format!("  ID:    {}\n", user.id));
    output.push_str(&format!("  Role:  {}\n", user.role.display_name()));
    output.push_str("  Permissions:\n");
    for permission in role_permissions(Some(user.role)) {
        output.push_str(&format!("    {}\n", permission));
    }
    output
}

/// Format the role → permission map
pub fn format_role_matrix() -> String {
    let mut output = String::new();
    for role in Role::ALL {
        let permissions = role_permissions(Some(role));
        output.push_str(&format!(
            "{} ({}): {} permissions\n",
            role.display_name(),
            role.as_str(),
            permissions.len()
        ));
        for permission in permissions {
            output.push_str(&format!("  {}\n", permission));
        }
        output.push('\n');
    }
    output
}
