//! Authorization
//!
//! - `policy`: the fixed role → permission map and the queries over it.
//! - `context`: the explicit `AuthContext` services receive from callers.

pub mod context;
pub mod policy;

pub use context::AuthContext;
pub use policy::{
    can_create_defects, can_delete_defects, can_edit_defects, can_export_data,
    can_manage_projects, can_manage_users, can_view_analytics, can_view_defects,
    has_all_permissions, has_any_permission, has_permission, has_permission_named,
    role_permissions,
};
