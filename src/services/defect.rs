//! Defect service
//!
//! Defect CRUD plus the pieces that hang off a defect: comments, the
//! change history, and per-project statistics.
//!
//! Every update snapshots the stored defect, applies the typed update, and
//! hands the recorder's entries to the history store in one batch.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::access::AuthContext;
use crate::audit::{diff, snapshot, EntityType, HistoryEntry};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{
    Comment, CommentId, Defect, DefectFilter, DefectId, DefectPriority, DefectStatus,
    DefectUpdate, Permission, ProjectId, UserId,
};
use crate::storage::Storage;

/// Input for filing a defect
#[derive(Debug, Clone, Default)]
pub struct NewDefect {
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub status: Option<DefectStatus>,
    pub priority: Option<DefectPriority>,
    pub assigned_to: Option<UserId>,
    pub due_date: Option<NaiveDate>,
}

/// Defect counts, optionally scoped to one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefectStatistics {
    pub total: usize,
    pub by_status: BTreeMap<DefectStatus, usize>,
    pub by_priority: BTreeMap<DefectPriority, usize>,
    /// Unfinished defects past their due date
    pub overdue: usize,
}

/// What a defect deletion removed besides the defect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefectDeletion {
    pub comments: usize,
    pub history: usize,
}

/// Service for defect management
pub struct DefectService<'a> {
    storage: &'a Storage,
}

impl<'a> DefectService<'a> {
    /// Create a new defect service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// File a new defect against an existing project
    pub fn create(&self, ctx: &AuthContext, input: NewDefect) -> TrackerResult<Defect> {
        let actor = ctx.require(Permission::CreateDefects)?;
        if input.assigned_to.is_some() {
            ctx.require(Permission::AssignDefects)?;
        }

        self.ensure_project(input.project_id)?;
        if let Some(assignee) = input.assigned_to {
            self.ensure_user(assignee)?;
        }

        let mut defect = Defect::new(input.project_id, input.title.trim(), self.storage.now());
        defect.description = input.description;
        defect.status = input.status.unwrap_or_default();
        defect.priority = input.priority.unwrap_or_default();
        defect.assigned_to = input.assigned_to;
        defect.due_date = input.due_date;
        defect.reported_by = Some(actor.id);

        defect
            .validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        self.storage.defects.put(defect.clone())?;
        tracing::info!(
            defect = %defect.id,
            project = %defect.project_id,
            user = %actor.id,
            "defect created"
        );

        Ok(defect)
    }

    /// Get a defect by ID
    pub fn get(&self, ctx: &AuthContext, id: DefectId) -> TrackerResult<Defect> {
        ctx.require(Permission::ViewDefects)?;
        self.storage
            .defects
            .get(id)?
            .ok_or_else(|| TrackerError::defect_not_found(id.to_string()))
    }

    /// Find a defect by its full or short ID
    pub fn find(&self, ctx: &AuthContext, identifier: &str) -> TrackerResult<Option<Defect>> {
        ctx.require(Permission::ViewDefects)?;
        Ok(self
            .storage
            .defects
            .find(&|d: &Defect| d.id.matches(identifier))?
            .into_iter()
            .next())
    }

    /// Find a defect by ID, failing if absent
    pub fn resolve(&self, ctx: &AuthContext, identifier: &str) -> TrackerResult<Defect> {
        self.find(ctx, identifier)?
            .ok_or_else(|| TrackerError::defect_not_found(identifier))
    }

    /// List defects matching `filter`, newest first
    pub fn list(&self, ctx: &AuthContext, filter: &DefectFilter) -> TrackerResult<Vec<Defect>> {
        ctx.require(Permission::ViewDefects)?;
        let mut defects = self.storage.defects.find(&|d: &Defect| filter.matches(d))?;
        defects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(defects)
    }

    /// Apply an update, recording one history entry per changed field
    ///
    /// Touching the assignee additionally needs `assign_defects`.
    pub fn update(
        &self,
        ctx: &AuthContext,
        id: DefectId,
        update: &DefectUpdate,
    ) -> TrackerResult<Defect> {
        let actor = ctx.require(Permission::EditDefects)?;
        if update.touches_assignee() {
            ctx.require(Permission::AssignDefects)?;
        }

        let mut defect = self
            .storage
            .defects
            .get(id)?
            .ok_or_else(|| TrackerError::defect_not_found(id.to_string()))?;

        if update.is_empty() {
            return Ok(defect);
        }

        if let Some(project_id) = update.project_id {
            self.ensure_project(project_id)?;
        }
        if let Some(Some(assignee)) = update.assigned_to {
            self.ensure_user(assignee)?;
        }

        let before = snapshot(&defect)?;
        let now = self.storage.now();
        defect.apply(update, now);

        defect
            .validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        let entries = diff(
            EntityType::Defect,
            &before,
            &update.field_updates(),
            Some(actor.id),
            Some(&defect.id.key()),
            now,
        )?;

        self.storage.defects.put(defect.clone())?;
        let changed = entries.len();
        self.storage.history.put_all(entries)?;

        tracing::info!(defect = %defect.id, user = %actor.id, changed, "defect updated");
        Ok(defect)
    }

    /// Delete a defect along with its comments and history
    pub fn delete(&self, ctx: &AuthContext, id: DefectId) -> TrackerResult<DefectDeletion> {
        let actor = ctx.require(Permission::DeleteDefects)?;

        if self.storage.defects.get(id)?.is_none() {
            return Err(TrackerError::defect_not_found(id.to_string()));
        }

        let key = id.key();
        let comments = self
            .storage
            .comments
            .remove_where(&|c: &Comment| c.defect_id == id)?;
        let history = self
            .storage
            .history
            .remove_where(&|h: &HistoryEntry| h.belongs_to(EntityType::Defect, &key))?;
        self.storage.defects.remove(id)?;

        tracing::info!(defect = %id, user = %actor.id, comments, history, "defect deleted");
        Ok(DefectDeletion { comments, history })
    }

    /// Change history of a defect, newest first
    pub fn history(&self, ctx: &AuthContext, id: DefectId) -> TrackerResult<Vec<HistoryEntry>> {
        ctx.require(Permission::ViewHistory)?;
        let key = id.key();
        let mut entries = self
            .storage
            .history
            .find(&|h: &HistoryEntry| h.belongs_to(EntityType::Defect, &key))?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    /// Comments on a defect, oldest first
    pub fn comments(&self, ctx: &AuthContext, id: DefectId) -> TrackerResult<Vec<Comment>> {
        ctx.require(Permission::ViewDefects)?;
        let mut comments = self
            .storage
            .comments
            .find(&|c: &Comment| c.defect_id == id)?;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    /// Leave a comment on a defect
    pub fn add_comment(
        &self,
        ctx: &AuthContext,
        defect_id: DefectId,
        content: &str,
    ) -> TrackerResult<Comment> {
        let actor = ctx.require(Permission::AddComments)?;

        if self.storage.defects.get(defect_id)?.is_none() {
            return Err(TrackerError::defect_not_found(defect_id.to_string()));
        }

        let comment = Comment::new(defect_id, actor.id, content.trim(), self.storage.now());
        comment.validate().map_err(TrackerError::Validation)?;

        self.storage.comments.put(comment.clone())?;
        tracing::info!(comment = %comment.id, defect = %defect_id, user = %actor.id, "comment added");

        Ok(comment)
    }

    /// Find a comment by its full or short ID
    pub fn find_comment(&self, ctx: &AuthContext, identifier: &str) -> TrackerResult<Comment> {
        ctx.require(Permission::ViewDefects)?;
        self.storage
            .comments
            .find(&|c: &Comment| c.id.matches(identifier))?
            .into_iter()
            .next()
            .ok_or_else(|| TrackerError::comment_not_found(identifier))
    }

    /// Delete a comment; authors may delete their own, others need
    /// `delete_defects`
    pub fn delete_comment(&self, ctx: &AuthContext, id: CommentId) -> TrackerResult<()> {
        let actor = ctx.require_user()?;

        let comment = self
            .storage
            .comments
            .get(id)?
            .ok_or_else(|| TrackerError::comment_not_found(id.to_string()))?;

        if comment.user_id != actor.id {
            ctx.require(Permission::DeleteDefects)?;
        }

        self.storage.comments.remove(id)?;
        tracing::info!(comment = %id, user = %actor.id, "comment deleted");
        Ok(())
    }

    /// Count defects by status and priority
    pub fn statistics(
        &self,
        ctx: &AuthContext,
        project_id: Option<ProjectId>,
    ) -> TrackerResult<DefectStatistics> {
        ctx.require(Permission::ViewAnalytics)?;

        let today = self.storage.now().date_naive();
        let defects = self
            .storage
            .defects
            .find(&|d: &Defect| project_id.map_or(true, |p| d.project_id == p))?;

        let mut stats = DefectStatistics {
            total: defects.len(),
            ..DefectStatistics::default()
        };
        for defect in &defects {
            *stats.by_status.entry(defect.status).or_insert(0) += 1;
            *stats.by_priority.entry(defect.priority).or_insert(0) += 1;
            if defect.is_overdue(today) {
                stats.overdue += 1;
            }
        }

        Ok(stats)
    }

    fn ensure_project(&self, id: ProjectId) -> TrackerResult<()> {
        match self.storage.projects.get(id)? {
            Some(_) => Ok(()),
            None => Err(TrackerError::project_not_found(id.to_string())),
        }
    }

    fn ensure_user(&self, id: UserId) -> TrackerResult<()> {
        match self.storage.users.get(id)? {
            Some(_) => Ok(()),
            None => Err(TrackerError::user_not_found(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{Project, Role, User, UserProfile};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    struct Fixture {
        storage: Storage,
        project: Project,
        admin: AuthContext,
        manager: AuthContext,
        lead: AuthContext,
        engineer: AuthContext,
    }

    fn signed_in(storage: &Storage, role: Role) -> AuthContext {
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

    fn fixture() -> Fixture {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let storage = Storage::in_memory()
            .with_clock(Arc::new(FixedClock::stepping(start, Duration::minutes(1))));
        let project = Project::new("Harbor", storage.now());
        storage.projects.put(project.clone()).unwrap();

        Fixture {
            admin: signed_in(&storage, Role::Admin),
            manager: signed_in(&storage, Role::Manager),
            lead: signed_in(&storage, Role::TeamLead),
            engineer: signed_in(&storage, Role::Engineer),
            storage,
            project,
        }
    }

    fn file(f: &Fixture, title: &str) -> Defect {
        DefectService::new(&f.storage)
            .create(
                &f.manager,
                NewDefect {
                    project_id: f.project.id,
                    title: title.into(),
                    ..NewDefect::default()
                },
            )
            .unwrap()
    }

    fn profile_id(ctx: &AuthContext) -> UserId {
        ctx.user().map(|u: &UserProfile| u.id).unwrap()
    }

    #[test]
    fn test_create_sets_defaults_and_reporter() {
        let f = fixture();
        let defect = file(&f, "  Cracked beam ");

        assert_eq!(defect.title, "Cracked beam");
        assert_eq!(defect.status, DefectStatus::New);
        assert_eq!(defect.priority, DefectPriority::Medium);
        assert_eq!(defect.reported_by, Some(profile_id(&f.manager)));
    }

    #[test]
    fn test_create_needs_permission_and_project() {
        let f = fixture();
        let service = DefectService::new(&f.storage);

        let err = service
            .create(
                &f.engineer,
                NewDefect {
                    project_id: f.project.id,
                    title: "Leak".into(),
                    ..NewDefect::default()
                },
            )
            .unwrap_err();
        assert!(err.is_forbidden());

        let err = service
            .create(
                &f.manager,
                NewDefect {
                    project_id: ProjectId::new(),
                    title: "Leak".into(),
                    ..NewDefect::default()
                },
            )
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_list_filters_and_sorts_newest_first() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let first = file(&f, "Loose railing");
        let second = file(&f, "Flooded basement");
        service
            .update(
                &f.manager,
                second.id,
                &DefectUpdate {
                    priority: Some(DefectPriority::Critical),
                    ..DefectUpdate::default()
                },
            )
            .unwrap();

        let all = service.list(&f.engineer, &DefectFilter::default()).unwrap();
        let ids: Vec<_> = all.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        let critical = service
            .list(
                &f.engineer,
                &DefectFilter {
                    priority: Some(DefectPriority::Critical),
                    ..DefectFilter::default()
                },
            )
            .unwrap();
        assert_eq!(critical.len(), 1);

        let searched = service
            .list(
                &f.engineer,
                &DefectFilter {
                    search: Some("RAILING".into()),
                    ..DefectFilter::default()
                },
            )
            .unwrap();
        assert_eq!(searched[0].id, first.id);
    }

    #[test]
    fn test_update_records_changed_fields_in_order() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let defect = file(&f, "Rusty bolt");

        let update = DefectUpdate {
            title: Some("Rusty bolt".into()),
            status: Some(DefectStatus::InProgress),
            priority: Some(DefectPriority::High),
            ..DefectUpdate::default()
        };
        service.update(&f.lead, defect.id, &update).unwrap();

        let history = service.history(&f.engineer, defect.id).unwrap();
        let fields: Vec<_> = history
            .iter()
            .map(|h| (h.field_name.as_str(), h.old_value.as_str(), h.new_value.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("status", "new", "in_progress"),
                ("priority", "medium", "high"),
            ]
        );
        assert!(history.iter().all(|h| h.user_id == profile_id(&f.lead)));
        assert!(history.iter().all(|h| h.record_id == defect.id.key()));
    }

    #[test]
    fn test_noop_update_writes_no_history() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let defect = file(&f, "Same");

        service
            .update(
                &f.manager,
                defect.id,
                &DefectUpdate {
                    title: Some("Same".into()),
                    ..DefectUpdate::default()
                },
            )
            .unwrap();
        assert!(f.storage.history.is_empty().unwrap());
    }

    #[test]
    fn test_assignment_needs_assign_permission() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let defect = file(&f, "Unassigned");
        let assignee = profile_id(&f.engineer);

        let assign = DefectUpdate {
            assigned_to: Some(Some(assignee)),
            ..DefectUpdate::default()
        };
        let err = service.update(&f.lead, defect.id, &assign).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Forbidden {
                permission: Permission::AssignDefects
            }
        ));

        let updated = service.update(&f.manager, defect.id, &assign).unwrap();
        assert_eq!(updated.assigned_to, Some(assignee));

        let history = service.history(&f.manager, defect.id).unwrap();
        assert_eq!(history[0].field_name, "assigned_to");
        assert_eq!(history[0].old_value, "");
        assert_eq!(history[0].new_value, assignee.key());

        let unassign = DefectUpdate {
            assigned_to: Some(None),
            ..DefectUpdate::default()
        };
        let cleared = service.update(&f.manager, defect.id, &unassign).unwrap();
        assert_eq!(cleared.assigned_to, None);
        let history = service.history(&f.manager, defect.id).unwrap();
        assert_eq!(history[0].old_value, assignee.key());
        assert_eq!(history[0].new_value, "");
    }

    #[test]
    fn test_assigning_unknown_user_fails() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let defect = file(&f, "Ghost work");

        let err = service
            .update(
                &f.admin,
                defect.id,
                &DefectUpdate {
                    assigned_to: Some(Some(UserId::new())),
                    ..DefectUpdate::default()
                },
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(f.storage.history.is_empty().unwrap());
    }

    #[test]
    fn test_engineer_cannot_edit() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let defect = file(&f, "Read only");

        let err = service
            .update(
                &f.engineer,
                defect.id,
                &DefectUpdate {
                    status: Some(DefectStatus::Closed),
                    ..DefectUpdate::default()
                },
            )
            .unwrap_err();
        assert!(err.is_forbidden());
        assert_eq!(
            f.storage.defects.get(defect.id).unwrap().unwrap().status,
            DefectStatus::New
        );
    }

    #[test]
    fn test_delete_cascades_to_comments_and_history_only() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let doomed = file(&f, "Doomed");
        let kept = file(&f, "Kept");

        for defect in [&doomed, &kept] {
            service
                .add_comment(&f.manager, defect.id, "looking into it")
                .unwrap();
            service
                .update(
                    &f.manager,
                    defect.id,
                    &DefectUpdate {
                        status: Some(DefectStatus::Open),
                        ..DefectUpdate::default()
                    },
                )
                .unwrap();
        }

        assert!(service.delete(&f.manager, doomed.id).unwrap_err().is_forbidden());

        let removed = service.delete(&f.admin, doomed.id).unwrap();
        assert_eq!(removed, DefectDeletion { comments: 1, history: 1 });

        assert!(f.storage.defects.get(doomed.id).unwrap().is_none());
        assert_eq!(service.comments(&f.admin, kept.id).unwrap().len(), 1);
        assert_eq!(service.history(&f.admin, kept.id).unwrap().len(), 1);
        assert!(service.delete(&f.admin, doomed.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_comments_oldest_first() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let defect = file(&f, "Chatty");

        service.add_comment(&f.manager, defect.id, "first").unwrap();
        service.add_comment(&f.lead, defect.id, "second").unwrap();

        let texts: Vec<_> = service
            .comments(&f.engineer, defect.id)
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_comment_permissions() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let defect = file(&f, "Discussed");

        assert!(service
            .add_comment(&f.engineer, defect.id, "can I?")
            .unwrap_err()
            .is_forbidden());
        assert!(service
            .add_comment(&f.manager, defect.id, "   ")
            .unwrap_err()
            .is_validation());
        assert!(service
            .add_comment(&f.manager, DefectId::new(), "where?")
            .unwrap_err()
            .is_not_found());

        let mine = service.add_comment(&f.lead, defect.id, "mine").unwrap();
        let theirs = service.add_comment(&f.manager, defect.id, "theirs").unwrap();

        assert!(service
            .delete_comment(&f.lead, theirs.id)
            .unwrap_err()
            .is_forbidden());
        service.delete_comment(&f.lead, mine.id).unwrap();
        service.delete_comment(&f.admin, theirs.id).unwrap();
        assert!(service.comments(&f.admin, defect.id).unwrap().is_empty());
    }

    #[test]
    fn test_statistics() {
        let f = fixture();
        let service = DefectService::new(&f.storage);
        let a = file(&f, "A");
        file(&f, "B");
        service
            .update(
                &f.manager,
                a.id,
                &DefectUpdate {
                    status: Some(DefectStatus::Resolved),
                    priority: Some(DefectPriority::Low),
                    ..DefectUpdate::default()
                },
            )
            .unwrap();

        let other = Project::new("Elsewhere", f.storage.now());
        f.storage.projects.put(other.clone()).unwrap();
        let mut late = Defect::new(other.id, "Late", f.storage.now());
        late.due_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        f.storage.defects.put(late).unwrap();

        assert!(service
            .statistics(&f.engineer, None)
            .unwrap_err()
            .is_forbidden());

        let scoped = service.statistics(&f.lead, Some(f.project.id)).unwrap();
        assert_eq!(scoped.total, 2);
        assert_eq!(scoped.by_status.get(&DefectStatus::Resolved), Some(&1));
        assert_eq!(scoped.by_status.get(&DefectStatus::New), Some(&1));
        assert_eq!(scoped.by_priority.get(&DefectPriority::Low), Some(&1));
        assert_eq!(scoped.overdue, 0);

        let all = service.statistics(&f.lead, None).unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.overdue, 1);
    }
}
