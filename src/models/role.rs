//! Roles and permissions
//!
//! Both sets are closed: a role or permission that does not parse is treated
//! as absent, and absent roles hold no permissions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;

/// Category of user determining the permitted actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Field engineer reporting and following defects
    Engineer,
    /// Manager planning work and assigning defects
    Manager,
    /// Team lead working defects for a crew
    TeamLead,
    /// Administrator with every permission
    Admin,
}

impl Role {
    /// All roles, lowest privilege first
    pub const ALL: [Role; 4] = [Role::Engineer, Role::TeamLead, Role::Manager, Role::Admin];

    /// Stable storage value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engineer => "engineer",
            Self::Manager => "manager",
            Self::TeamLead => "team_lead",
            Self::Admin => "admin",
        }
    }

    /// Parse a role from its storage value (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "engineer" => Some(Self::Engineer),
            "manager" => Some(Self::Manager),
            "team_lead" | "teamlead" | "team-lead" => Some(Self::TeamLead),
            "admin" | "administrator" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Engineer => "Engineer",
            Self::Manager => "Manager",
            Self::TeamLead => "Team Lead",
            Self::Admin => "Administrator",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Engineer
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Role {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            TrackerError::Validation(format!(
                "Invalid role: '{}'. Valid roles: engineer, team_lead, manager, admin",
                s
            ))
        })
    }
}

/// Atomic capability checked before an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDefects,
    CreateDefects,
    EditDefects,
    DeleteDefects,
    /// Change who a defect is assigned to
    AssignDefects,
    ViewProjects,
    CreateProjects,
    EditProjects,
    DeleteProjects,
    ViewReports,
    ExportData,
    ManageUsers,
    ManageAccess,
    AddComments,
    ViewHistory,
    CoordinateWork,
    DistributeTasks,
    ViewAnalytics,
}

impl Permission {
    /// Every known permission
    pub const ALL: [Permission; 18] = [
        Permission::ViewDefects,
        Permission::CreateDefects,
        Permission::EditDefects,
        Permission::DeleteDefects,
        Permission::AssignDefects,
        Permission::ViewProjects,
        Permission::CreateProjects,
        Permission::EditProjects,
        Permission::DeleteProjects,
        Permission::ViewReports,
        Permission::ExportData,
        Permission::ManageUsers,
        Permission::ManageAccess,
        Permission::AddComments,
        Permission::ViewHistory,
        Permission::CoordinateWork,
        Permission::DistributeTasks,
        Permission::ViewAnalytics,
    ];

    /// Stable storage value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewDefects => "view_defects",
            Self::CreateDefects => "create_defects",
            Self::EditDefects => "edit_defects",
            Self::DeleteDefects => "delete_defects",
            Self::AssignDefects => "assign_defects",
            Self::ViewProjects => "view_projects",
            Self::CreateProjects => "create_projects",
            Self::EditProjects => "edit_projects",
            Self::DeleteProjects => "delete_projects",
            Self::ViewReports => "view_reports",
            Self::ExportData => "export_data",
            Self::ManageUsers => "manage_users",
            Self::ManageAccess => "manage_access",
            Self::AddComments => "add_comments",
            Self::ViewHistory => "view_history",
            Self::CoordinateWork => "coordinate_work",
            Self::DistributeTasks => "distribute_tasks",
            Self::ViewAnalytics => "view_analytics",
        }
    }

    /// Parse a permission from its storage value
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| TrackerError::Validation(format!("Unknown permission: '{}'", s)))
    }
}
