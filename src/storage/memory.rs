//! In-process record store
//!
//! Keeps a collection in a `RwLock<Vec<_>>`. Used by the `memory` backend
//! and throughout the tests.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{TrackerError, TrackerResult};

use super::record::{upsert, Record, RecordStore};

/// Record store that lives only as long as the process
pub struct MemoryStore<R: Record> {
    records: RwLock<Vec<R>>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Store seeded with existing records
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    fn read(&self) -> TrackerResult<RwLockReadGuard<'_, Vec<R>>> {
        self.records
            .read()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> TrackerResult<RwLockWriteGuard<'_, Vec<R>>> {
        self.records
            .write()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> for MemoryStore<R> {
    fn get(&self, id: R::Id) -> TrackerResult<Option<R>> {
        Ok(self.read()?.iter().find(|r| r.id() == id).cloned())
    }

    fn all(&self) -> TrackerResult<Vec<R>> {
        Ok(self.read()?.clone())
    }

    fn put(&self, record: R) -> TrackerResult<bool> {
        Ok(upsert(&mut *self.write()?, record))
    }

    fn put_all(&self, records: Vec<R>) -> TrackerResult<()> {
        let mut stored = self.write()?;
        for record in records {
            upsert(&mut stored, record);
        }
        Ok(())
    }

    fn remove(&self, id: R::Id) -> TrackerResult<bool> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() != before)
    }

    fn remove_where(&self, predicate: &dyn Fn(&R) -> bool) -> TrackerResult<usize> {
        let mut records = self.write()?;
        let before = records.len();
        records.retain(|r| !predicate(r));
        Ok(before - records.len())
    }

    fn find(&self, predicate: &dyn Fn(&R) -> bool) -> TrackerResult<Vec<R>> {
        Ok(self.read()?.iter().filter(|r| predicate(r)).cloned().collect())
    }

    fn len(&self) -> TrackerResult<usize> {
        Ok(self.read()?.len())
    }
}
