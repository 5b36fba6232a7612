//! Storage layer for the defect tracker
//!
//! One `RecordStore` per entity, all reached through the `Storage`
//! coordinator. The backend (JSON files or process memory) is chosen once
//! at startup; everything above this layer only sees the trait.

pub mod file_io;
pub mod init;
pub mod json;
pub mod memory;
pub mod record;
pub mod session;

pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{Record, RecordStore};
pub use session::SessionStore;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::audit::HistoryEntry;
use crate::clock::{Clock, SystemClock};
use crate::config::paths::TrackerPaths;
use crate::config::settings::{Backend, Settings};
use crate::error::TrackerError;
use crate::models::{Comment, Defect, Project, User};

/// Main storage coordinator that provides access to all record stores
pub struct Storage {
    backend: Backend,
    paths: Option<TrackerPaths>,
    clock: Arc<dyn Clock>,
    pub users: Box<dyn RecordStore<User>>,
    pub projects: Box<dyn RecordStore<Project>>,
    pub defects: Box<dyn RecordStore<Defect>>,
    pub comments: Box<dyn RecordStore<Comment>>,
    pub history: Box<dyn RecordStore<HistoryEntry>>,
    pub session: SessionStore,
}

impl Storage {
    /// Open storage with the backend the settings ask for
    pub fn open(paths: TrackerPaths, settings: &Settings) -> Result<Self, TrackerError> {
        match settings.backend {
            Backend::Json => Self::json(paths),
            Backend::Memory => Ok(Self::in_memory()),
        }
    }

    /// JSON file storage under the data directory
    pub fn json(paths: TrackerPaths) -> Result<Self, TrackerError> {
        paths.ensure_directories()?;

        let storage = Self {
            backend: Backend::Json,
            clock: Arc::new(SystemClock),
            users: Box::new(JsonFileStore::open(paths.users_file())?),
            projects: Box::new(JsonFileStore::open(paths.projects_file())?),
            defects: Box::new(JsonFileStore::open(paths.defects_file())?),
            comments: Box::new(JsonFileStore::open(paths.comments_file())?),
            history: Box::new(JsonFileStore::open(paths.history_file())?),
            session: SessionStore::open(paths.session_file())?,
            paths: Some(paths),
        };

        tracing::debug!(backend = %storage.backend, "storage opened");
        Ok(storage)
    }

    /// Process-local storage; nothing is written to disk
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            paths: None,
            clock: Arc::new(SystemClock),
            users: Box::new(MemoryStore::new()),
            projects: Box::new(MemoryStore::new()),
            defects: Box::new(MemoryStore::new()),
            comments: Box::new(MemoryStore::new()),
            history: Box::new(MemoryStore::new()),
            session: SessionStore::in_memory(),
        }
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the configured clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Paths backing the JSON backend; `None` in memory
    pub fn paths(&self) -> Option<&TrackerPaths> {
        self.paths.as_ref()
    }
}
