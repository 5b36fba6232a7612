//! Role to permission mapping and authorization queries
//!
//! The mapping is a compile-time constant, so every query is a lookup over
//! immutable data and can run from any thread without coordination. Every
//! query fails closed: an absent or unknown role, an unknown permission, or
//! an empty permission list all answer `false`.

use crate::models::{Permission, Role};

use Permission::*;

const ENGINEER: &[Permission] = &[ViewDefects, ViewProjects, ViewHistory];

const MANAGER: &[Permission] = &[
    ViewDefects,
    CreateDefects,
    EditDefects,
    AssignDefects,
    ViewProjects,
    CreateProjects,
    EditProjects,
    ViewReports,
    ExportData,
    AddComments,
    ViewHistory,
    CoordinateWork,
    DistributeTasks,
    ViewAnalytics,
];

const TEAM_LEAD: &[Permission] = &[
    ViewDefects,
    EditDefects,
    ViewProjects,
    ViewReports,
    AddComments,
    ViewHistory,
    ViewAnalytics,
];

const ADMIN: &[Permission] = &Permission::ALL;

/// The fixed permission set of a role, or an empty set for no role
pub fn role_permissions(role: Option<Role>) -> &'static [Permission] {
    match role {
        Some(Role::Engineer) => ENGINEER,
        Some(Role::Manager) => MANAGER,
        Some(Role::TeamLead) => TEAM_LEAD,
        Some(Role::Admin) => ADMIN,
        None => &[],
    }
}

/// Whether `role` grants `permission`
pub fn has_permission(role: Option<Role>, permission: Permission) -> bool {
    role_permissions(role).contains(&permission)
}

/// Whether `role` grants at least one of `permissions`
pub fn has_any_permission(role: Option<Role>, permissions: &[Permission]) -> bool {
    permissions.iter().any(|p| has_permission(role, *p))
}

/// Whether `role` grants every one of `permissions`
///
/// An empty list answers `false`.
pub fn has_all_permissions(role: Option<Role>, permissions: &[Permission]) -> bool {
    !permissions.is_empty() && permissions.iter().all(|p| has_permission(role, *p))
}

/// `has_permission` over raw storage values
///
/// Anything that does not parse is denied.
pub fn has_permission_named(role: &str, permission: &str) -> bool {
    match Permission::parse(permission) {
        Some(permission) => has_permission(Role::parse(role), permission),
        None => false,
    }
}

pub fn can_view_defects(role: Option<Role>) -> bool {
    has_permission(role, ViewDefects)
}

pub fn can_create_defects(role: Option<Role>) -> bool {
    has_permission(role, CreateDefects)
}

pub fn can_edit_defects(role: Option<Role>) -> bool {
    has_permission(role, EditDefects)
}

pub fn can_delete_defects(role: Option<Role>) -> bool {
    has_permission(role, DeleteDefects)
}

/// Any of creating, editing or deleting projects
pub fn can_manage_projects(role: Option<Role>) -> bool {
    has_any_permission(role, &[CreateProjects, EditProjects, DeleteProjects])
}

pub fn can_manage_users(role: Option<Role>) -> bool {
    has_permission(role, ManageUsers)
}

pub fn can_export_data(role: Option<Role>) -> bool {
    has_permission(role, ExportData)
}

pub fn can_view_analytics(role: Option<Role>) -> bool {
    has_permission(role, ViewAnalytics)
}
