//! Export module for the defect tracker
//!
//! Provides complete data export functionality in multiple formats:
//! - CSV: defect listings (spreadsheet-compatible)
//! - JSON: machine-readable full database export
//! - YAML: human-readable full database export
//!
//! Every export needs the `export_data` permission.

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_defects_csv;
pub use json::{export_full_json, read_full_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, read_full_yaml};

#[cfg(test)]
pub(crate) mod tests {
    use crate::access::AuthContext;
    use crate::models::{DefectStatus, DefectUpdate, Project, Role, User};
    use crate::services::{DefectService, NewDefect};
    use crate::storage::Storage;

    pub fn signed_in(storage: &Storage, role: Role) -> AuthContext {
        let user = User::new(
            &format!("{}@example.com", role.as_str()),
            "$argon2id$stub".into(),
            role.display_name(),
            role,
            storage.now(),
        );
        storage.users.put(user.clone()).unwrap();
        AuthContext::signed_in(user.profile())
    }

    /// One project, two defects, one comment, one history entry
    pub fn seeded_storage() -> Storage {
        let storage = Storage::in_memory();
        let seeder = User::new(
            "seed@example.com",
            "$argon2id$stub".into(),
            "Seeder",
            Role::Admin,
            storage.now(),
        );
        storage.users.put(seeder.clone()).unwrap();
        let ctx = AuthContext::signed_in(seeder.profile());

        let project = Project::new("Harbor", storage.now());
        storage.projects.put(project.clone()).unwrap();

        let service = DefectService::new(&storage);
        let crack = service
            .create(
                &ctx,
                NewDefect {
                    project_id: project.id,
                    title: "Crack in slab".into(),
                    ..NewDefect::default()
                },
            )
            .unwrap();
        service
            .create(
                &ctx,
                NewDefect {
                    project_id: project.id,
                    title: "Leak, east stairwell".into(),
                    description: "Water pooling \"near\" the landing".into(),
                    ..NewDefect::default()
                },
            )
            .unwrap();
        service.add_comment(&ctx, crack.id, "Measured 3mm").unwrap();
        service
            .update(
                &ctx,
                crack.id,
                &DefectUpdate {
                    status: Some(DefectStatus::Open),
                    ..DefectUpdate::default()
                },
            )
            .unwrap();

        storage
    }
}
