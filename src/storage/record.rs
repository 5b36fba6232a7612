//! The record store interface
//!
//! Every entity collection (users, projects, defects, comments, history) is
//! reached through `RecordStore`, so services are written once and the
//! backend is picked at startup.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::audit::HistoryEntry;
use crate::error::TrackerResult;
use crate::models::{
    Comment, CommentId, Defect, DefectId, HistoryId, Project, ProjectId, User, UserId,
};

/// An entity that can live in a record store
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Copy + Eq + fmt::Display + Send + Sync;

    /// Entity name used in errors and logs
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;
}

/// Persistence for one entity collection
///
/// Implementations must be crash-consistent per call: after a crash a
/// mutation is either fully visible or not at all. `put_all` applies its
/// whole batch as one such mutation.
pub trait RecordStore<R: Record>: Send + Sync {
    /// Look a record up by id
    fn get(&self, id: R::Id) -> TrackerResult<Option<R>>;

    /// Every record, in insertion order
    fn all(&self) -> TrackerResult<Vec<R>>;

    /// Insert or replace a record; `true` if it was newly inserted
    fn put(&self, record: R) -> TrackerResult<bool>;

    /// Insert or replace a batch of records in one step
    fn put_all(&self, records: Vec<R>) -> TrackerResult<()>;

    /// Remove a record; `true` if it existed
    fn remove(&self, id: R::Id) -> TrackerResult<bool>;

    /// Remove every record matching `predicate`, returning how many went
    fn remove_where(&self, predicate: &dyn Fn(&R) -> bool) -> TrackerResult<usize>;

    /// Records matching `predicate`, in insertion order
    fn find(&self, predicate: &dyn Fn(&R) -> bool) -> TrackerResult<Vec<R>> {
        Ok(self.all()?.into_iter().filter(|r| predicate(r)).collect())
    }

    fn len(&self) -> TrackerResult<usize> {
        Ok(self.all()?.len())
    }

    fn is_empty(&self) -> TrackerResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Insert-or-replace shared by the backends; `true` if newly inserted
pub(crate) fn upsert<R: Record>(records: &mut Vec<R>, record: R) -> bool {
    let id = record.id();
    match records.iter_mut().find(|r| r.id() == id) {
        Some(existing) => {
            *existing = record;
            false
        }
        None => {
            records.push(record);
            true
        }
    }
}

impl Record for User {
    type Id = UserId;
    const ENTITY: &'static str = "User";

    fn id(&self) -> UserId {
        self.id
    }
}

impl Record for Project {
    type Id = ProjectId;
    const ENTITY: &'static str = "Project";

    fn id(&self) -> ProjectId {
        self.id
    }
}

impl Record for Defect {
    type Id = DefectId;
    const ENTITY: &'static str = "Defect";

    fn id(&self) -> DefectId {
        self.id
    }
}

impl Record for Comment {
    type Id = CommentId;
    const ENTITY: &'static str = "Comment";

    fn id(&self) -> CommentId {
        self.id
    }
}

impl Record for HistoryEntry {
    type Id = HistoryId;
    const ENTITY: &'static str = "HistoryEntry";

    fn id(&self) -> HistoryId {
        self.id
    }
}
