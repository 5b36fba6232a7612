//! Path management for the defect tracker
//!
//! ## Path Resolution Order
//!
//! 1. `TRACKER_DATA_DIR` environment variable (if set)
//! 2. `$XDG_CONFIG_HOME/defect-tracker` (if set)
//! 3. The platform config directory from `directories`
//!    (`~/.config/defect-tracker`, `%APPDATA%\defect-tracker\config`, ...)

use std::path::PathBuf;

use crate::error::TrackerError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "TRACKER_DATA_DIR";

/// Manages all paths used by the defect tracker
#[derive(Debug, Clone)]
pub struct TrackerPaths {
    base_dir: PathBuf,
}

impl TrackerPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home/config directory can be determined.
    pub fn new() -> Result<Self, TrackerError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the collection files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Settings file (config.json)
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    pub fn projects_file(&self) -> PathBuf {
        self.data_dir().join("projects.json")
    }

    pub fn defects_file(&self) -> PathBuf {
        self.data_dir().join("defects.json")
    }

    pub fn comments_file(&self) -> PathBuf {
        self.data_dir().join("comments.json")
    }

    pub fn history_file(&self) -> PathBuf {
        self.data_dir().join("history.json")
    }

    /// The signed-in user, kept between CLI invocations
    pub fn session_file(&self) -> PathBuf {
        self.data_dir().join("session.json")
    }

    /// All collection files, in initialization order
    pub fn collection_files(&self) -> [PathBuf; 5] {
        [
            self.users_file(),
            self.projects_file(),
            self.defects_file(),
            self.comments_file(),
            self.history_file(),
        ]
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), TrackerError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TrackerError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| TrackerError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, TrackerError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Ok(PathBuf::from(xdg).join("defect-tracker"));
        }
    }

    directories::ProjectDirs::from("", "", "defect-tracker")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| TrackerError::Config("Could not determine a configuration directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(
            paths.history_file(),
            temp_dir.path().join("data").join("history.json")
        );
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var(DATA_DIR_ENV, temp_dir.path());
        let paths = TrackerPaths::new().unwrap();
        env::remove_var(DATA_DIR_ENV);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
    }
}
