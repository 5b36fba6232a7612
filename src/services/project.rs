//! Project service
//!
//! Project CRUD. Updates record field-level history; deleting a project
//! cascades to its defects and everything hanging off them.

use std::collections::HashSet;

use crate::access::AuthContext;
use crate::audit::{diff, snapshot, EntityType, HistoryEntry};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Comment, Defect, Permission, Project, ProjectId, ProjectStatus, ProjectUpdate};
use crate::storage::Storage;

/// What a project deletion removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectDeletion {
    pub defects: usize,
    pub comments: usize,
    pub history: usize,
}

/// Service for project management
pub struct ProjectService<'a> {
    storage: &'a Storage,
}

impl<'a> ProjectService<'a> {
    /// Create a new project service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new project
    pub fn create(
        &self,
        ctx: &AuthContext,
        name: &str,
        description: Option<&str>,
        status: Option<ProjectStatus>,
    ) -> TrackerResult<Project> {
        let actor = ctx.require(Permission::CreateProjects)?;

        let mut project = Project::new(name.trim(), self.storage.now());
        project.description = description.unwrap_or_default().to_string();
        project.status = status.unwrap_or_default();
        project.created_by = Some(actor.id);

        project
            .validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        self.storage.projects.put(project.clone())?;
        tracing::info!(project = %project.id, user = %actor.id, "project created");

        Ok(project)
    }

    /// Get a project by ID
    pub fn get(&self, ctx: &AuthContext, id: ProjectId) -> TrackerResult<Project> {
        ctx.require(Permission::ViewProjects)?;
        self.storage
            .projects
            .get(id)?
            .ok_or_else(|| TrackerError::project_not_found(id.to_string()))
    }

    /// Find a project by ID or name
    pub fn find(&self, ctx: &AuthContext, identifier: &str) -> TrackerResult<Option<Project>> {
        ctx.require(Permission::ViewProjects)?;
        let identifier = identifier.trim();

        let by_id = self
            .storage
            .projects
            .find(&|p: &Project| p.id.matches(identifier))?;
        if let Some(project) = by_id.into_iter().next() {
            return Ok(Some(project));
        }

        let needle = identifier.to_lowercase();
        Ok(self
            .storage
            .projects
            .find(&|p: &Project| p.name.to_lowercase() == needle)?
            .into_iter()
            .next())
    }

    /// Find a project by ID or name, failing if absent
    pub fn resolve(&self, ctx: &AuthContext, identifier: &str) -> TrackerResult<Project> {
        self.find(ctx, identifier)?
            .ok_or_else(|| TrackerError::project_not_found(identifier))
    }

    /// List all projects, newest first
    pub fn list(&self, ctx: &AuthContext) -> TrackerResult<Vec<Project>> {
        ctx.require(Permission::ViewProjects)?;
        let mut projects = self.storage.projects.all()?;
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    /// Apply an update, recording one history entry per changed field
    pub fn update(
        &self,
        ctx: &AuthContext,
        id: ProjectId,
        update: &ProjectUpdate,
    ) -> TrackerResult<Project> {
        let actor = ctx.require(Permission::EditProjects)?;

        let mut project = self
            .storage
            .projects
            .get(id)?
            .ok_or_else(|| TrackerError::project_not_found(id.to_string()))?;

        if update.is_empty() {
            return Ok(project);
        }

        let before = snapshot(&project)?;
        let now = self.storage.now();
        project.apply(update, now);

        project
            .validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        let entries = diff(
            EntityType::Project,
            &before,
            &update.field_updates(),
            Some(actor.id),
            Some(&project.id.key()),
            now,
        )?;

        self.storage.projects.put(project.clone())?;
        let changed = entries.len();
        self.storage.history.put_all(entries)?;

        tracing::info!(project = %project.id, user = %actor.id, changed, "project updated");
        Ok(project)
    }

    /// Delete a project with its defects, their comments, and all history
    pub fn delete(&self, ctx: &AuthContext, id: ProjectId) -> TrackerResult<ProjectDeletion> {
        let actor = ctx.require(Permission::DeleteProjects)?;

        if self.storage.projects.get(id)?.is_none() {
            return Err(TrackerError::project_not_found(id.to_string()));
        }

        let defects = self
            .storage
            .defects
            .find(&|d: &Defect| d.project_id == id)?;
        let defect_ids: HashSet<_> = defects.iter().map(|d| d.id).collect();
        let defect_keys: HashSet<String> = defect_ids.iter().map(|d| d.key()).collect();
        let project_key = id.key();

        // Children first: an interrupted delete leaves the project in place
        // and can simply be retried.
        let comments = self
            .storage
            .comments
            .remove_where(&|c: &Comment| defect_ids.contains(&c.defect_id))?;
        let history = self.storage.history.remove_where(&|h: &HistoryEntry| {
            h.belongs_to(EntityType::Project, &project_key)
                || (h.entity_type == EntityType::Defect && defect_keys.contains(&h.record_id))
        })?;
        let removed_defects = self
            .storage
            .defects
            .remove_where(&|d: &Defect| d.project_id == id)?;
        self.storage.projects.remove(id)?;

        tracing::info!(
            project = %id,
            user = %actor.id,
            defects = removed_defects,
            comments,
            history,
            "project deleted"
        );

        Ok(ProjectDeletion {
            defects: removed_defects,
            comments,
            history,
        })
    }

    /// Change history of a project, newest first
    pub fn history(&self, ctx: &AuthContext, id: ProjectId) -> TrackerResult<Vec<HistoryEntry>> {
        ctx.require(Permission::ViewHistory)?;
        let key = id.key();
        let mut entries = self
            .storage
            .history
            .find(&|h: &HistoryEntry| h.belongs_to(EntityType::Project, &key))?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{DefectId, Role, UserId, UserProfile};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn ctx(role: Role) -> AuthContext {
        AuthContext::signed_in(UserProfile {
            id: UserId::new(),
            email: format!("{}@example.com", role.as_str()),
            full_name: role.display_name().to_string(),
            role,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    fn storage() -> Storage {
        Storage::in_memory().with_clock(Arc::new(FixedClock::stepping(
            Utc::now(),
            Duration::seconds(1),
        )))
    }

    #[test]
    fn test_create_defaults_to_active() {
        let storage = storage();
        let service = ProjectService::new(&storage);
        let manager = ctx(Role::Manager);

        let project = service.create(&manager, "  Riverside  ", None, None).unwrap();
        assert_eq!(project.name, "Riverside");
        assert_eq!(project.status, ProjectStatus::Active);
        assert_eq!(project.created_by, manager.user_id());
    }

    #[test]
    fn test_create_requires_permission() {
        let storage = storage();
        let service = ProjectService::new(&storage);

        let err = service
            .create(&ctx(Role::Engineer), "Nope", None, None)
            .unwrap_err();
        assert!(err.is_forbidden());
        assert!(matches!(
            service.create(&AuthContext::anonymous(), "Nope", None, None),
            Err(TrackerError::Unauthenticated)
        ));
        assert!(storage.projects.is_empty().unwrap());
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let storage = storage();
        let service = ProjectService::new(&storage);
        let err = service
            .create(&ctx(Role::Admin), "   ", None, None)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_list_newest_first() {
        let storage = storage();
        let service = ProjectService::new(&storage);
        let admin = ctx(Role::Admin);
        service.create(&admin, "First", None, None).unwrap();
        service.create(&admin, "Second", None, None).unwrap();

        let names: Vec<_> = service
            .list(&ctx(Role::Engineer))
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn test_update_records_history() {
        let storage = storage();
        let service = ProjectService::new(&storage);
        let manager = ctx(Role::Manager);
        let project = service.create(&manager, "Depot", None, None).unwrap();

        let update = ProjectUpdate {
            name: Some("Depot".into()),
            status: Some(ProjectStatus::OnHold),
            ..ProjectUpdate::default()
        };
        let updated = service.update(&manager, project.id, &update).unwrap();
        assert_eq!(updated.status, ProjectStatus::OnHold);
        assert!(updated.updated_at > project.updated_at);

        let history = service.history(&manager, project.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].field_name, "status");
        assert_eq!(history[0].old_value, "active");
        assert_eq!(history[0].new_value, "on_hold");
        assert_eq!(history[0].user_id, manager.user_id().unwrap());
    }

    #[test]
    fn test_find_by_name_or_id() {
        let storage = storage();
        let service = ProjectService::new(&storage);
        let admin = ctx(Role::Admin);
        let project = service.create(&admin, "North Yard", None, None).unwrap();

        let by_name = service.find(&admin, "north yard").unwrap().unwrap();
        assert_eq!(by_name.id, project.id);
        let by_id = service.find(&admin, &project.id.to_string()).unwrap().unwrap();
        assert_eq!(by_id.id, project.id);
        assert!(service.resolve(&admin, "South Yard").unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_cascades() {
        let storage = storage();
        let service = ProjectService::new(&storage);
        let admin = ctx(Role::Admin);
        let doomed = service.create(&admin, "Doomed", None, None).unwrap();
        let kept = service.create(&admin, "Kept", None, None).unwrap();

        let now = storage.now();
        let doomed_defect = Defect::new(doomed.id, "Crack", now);
        let kept_defect = Defect::new(kept.id, "Leak", now);
        storage
            .defects
            .put_all(vec![doomed_defect.clone(), kept_defect.clone()])
            .unwrap();
        let author = admin.user_id().unwrap();
        storage
            .comments
            .put_all(vec![
                Comment::new(doomed_defect.id, author, "on doomed", now),
                Comment::new(kept_defect.id, author, "on kept", now),
                Comment::new(DefectId::new(), author, "orphan", now),
            ])
            .unwrap();
        service
            .update(
                &admin,
                doomed.id,
                &ProjectUpdate {
                    description: Some("going away".into()),
                    ..ProjectUpdate::default()
                },
            )
            .unwrap();
        service
            .update(
                &admin,
                kept.id,
                &ProjectUpdate {
                    description: Some("staying".into()),
                    ..ProjectUpdate::default()
                },
            )
            .unwrap();

        let removed = service.delete(&admin, doomed.id).unwrap();
        assert_eq!(
            removed,
            ProjectDeletion {
                defects: 1,
                comments: 1,
                history: 1,
            }
        );

        assert!(storage.projects.get(doomed.id).unwrap().is_none());
        assert!(storage.defects.get(kept_defect.id).unwrap().is_some());
        assert_eq!(storage.comments.len().unwrap(), 2);
        assert_eq!(service.history(&admin, kept.id).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_requires_permission_and_existence() {
        let storage = storage();
        let service = ProjectService::new(&storage);
        let admin = ctx(Role::Admin);
        let project = service.create(&admin, "Stays", None, None).unwrap();

        assert!(service
            .delete(&ctx(Role::Manager), project.id)
            .unwrap_err()
            .is_forbidden());
        assert!(service
            .delete(&admin, ProjectId::new())
            .unwrap_err()
            .is_not_found());
        assert_eq!(storage.projects.len().unwrap(), 1);
    }
}
