//! JSON file record store
//!
//! Each collection is one JSON array file. The collection is loaded once
//! when the store is opened; every mutation rewrites the file atomically
//! while still holding the write lock, so concurrent writers cannot persist
//! stale snapshots over each other. If the write fails the in-memory
//! collection is rolled back, keeping memory and disk in agreement.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{TrackerError, TrackerResult};

use super::file_io::{read_json, write_json_atomic};
use super::record::{upsert, Record, RecordStore};

/// Record store backed by a JSON array file
pub struct JsonFileStore<R: Record> {
    path: PathBuf,
    records: RwLock<Vec<R>>,
}

impl<R: Record> JsonFileStore<R> {
    /// Open a collection file, loading whatever it holds
    ///
    /// A missing file is an empty collection; it is created on first write.
    pub fn open(path: PathBuf) -> TrackerResult<Self> {
        let records: Vec<R> = read_json(&path)?;
        tracing::debug!(
            entity = R::ENTITY,
            path = %path.display(),
            count = records.len(),
            "loaded collection"
        );
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the collection from disk, discarding in-memory state
    pub fn reload(&self) -> TrackerResult<()> {
        let records: Vec<R> = read_json(&self.path)?;
        *self.write()? = records;
        Ok(())
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

    /// Apply `change` and persist, restoring the previous state on failure
    fn mutate<T>(&self, change: impl FnOnce(&mut Vec<R>) -> T) -> TrackerResult<T> {
        let mut records = self.write()?;
        let previous = records.clone();
        let outcome = change(&mut records);

        if let Err(err) = write_json_atomic(&self.path, records.as_slice()) {
            tracing::warn!(
                entity = R::ENTITY,
                path = %self.path.display(),
                error = %err,
                "write failed, rolling back"
            );
            *records = previous;
            return Err(err);
        }

        Ok(outcome)
    }
}

impl<R: Record> RecordStore<R> for JsonFileStore<R> {
    fn get(&self, id: R::Id) -> TrackerResult<Option<R>> {
        Ok(self.read()?.iter().find(|r| r.id() == id).cloned())
    }

    fn all(&self) -> TrackerResult<Vec<R>> {
        Ok(self.read()?.clone())
    }

    fn put(&self, record: R) -> TrackerResult<bool> {
        self.mutate(|records| upsert(records, record))
    }

    fn put_all(&self, batch: Vec<R>) -> TrackerResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.mutate(|records| {
            for record in batch {
                upsert(records, record);
            }
        })
    }

    fn remove(&self, id: R::Id) -> TrackerResult<bool> {
        if !self.read()?.iter().any(|r| r.id() == id) {
            return Ok(false);
        }
        self.mutate(|records| {
            let before = records.len();
            records.retain(|r| r.id() != id);
            records.len() != before
        })
    }

    fn remove_where(&self, predicate: &dyn Fn(&R) -> bool) -> TrackerResult<usize> {
        if !self.read()?.iter().any(|r| predicate(r)) {
            return Ok(0);
        }
        self.mutate(|records| {
            let before = records.len();
            records.retain(|r| !predicate(r));
            before - records.len()
        })
    }

    fn find(&self, predicate: &dyn Fn(&R) -> bool) -> TrackerResult<Vec<R>> {
        Ok(self.read()?.iter().filter(|r| predicate(r)).cloned().collect())
    }

    fn len(&self) -> TrackerResult<usize> {
        Ok(self.read()?.len())
    }
}
