//! Signed-in user persistence
//!
//! A CLI process is short-lived, so the signed-in user is kept in
//! `session.json` between invocations. The session is set at sign-in and
//! cleared at sign-out; nothing else writes it.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{TrackerError, TrackerResult};
use crate::models::UserProfile;

use super::file_io::{read_json, write_json_atomic};

/// Holder for the current session
pub struct SessionStore {
    path: Option<PathBuf>,
    current: RwLock<Option<UserProfile>>,
}

impl SessionStore {
    /// Session kept only in memory
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: RwLock::new(None),
        }
    }

    /// Session persisted to `path`, loading any existing one
    pub fn open(path: PathBuf) -> TrackerResult<Self> {
        let current: Option<UserProfile> = read_json(&path)?;
        Ok(Self {
            path: Some(path),
            current: RwLock::new(current),
        })
    }

    /// The signed-in user, if any
    pub fn get(&self) -> TrackerResult<Option<UserProfile>> {
        self.current
            .read()
            .map(|current| current.clone())
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    /// Start (or refresh) the session for `user`
    pub fn set(&self, user: UserProfile) -> TrackerResult<()> {
        self.store(Some(user))
    }

    /// End the session
    pub fn clear(&self) -> TrackerResult<()> {
        self.store(None)
    }

    fn store(&self, value: Option<UserProfile>) -> TrackerResult<()> {
        let mut current = self
            .current
            .write()
            .map_err(|e| TrackerError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(path) = &self.path {
            write_json_atomic(path, &value)?;
        }
        *current = value;
        Ok(())
    }
}
