//! User settings for the defect tracker
//!
//! Persisted as `config.json` in the base directory. Every field has a
//! serde default so older or hand-edited files keep loading.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::paths::TrackerPaths;
use crate::crypto::HashParams;
use crate::error::TrackerError;

/// Timestamp format used when none (or an invalid one) is configured
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Whether `format` is a strftime pattern chrono can render
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Environment variable overriding the configured backend
pub const BACKEND_ENV: &str = "TRACKER_BACKEND";

/// Which record store implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON files under the data directory
    #[default]
    Json,
    /// Process-local collections; nothing survives exit
    Memory,
}

impl Backend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" | "file" | "local" => Some(Self::Json),
            "memory" | "mem" | "in-memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Record store backend
    #[serde(default)]
    pub backend: Backend,

    /// Minimum accepted password length at sign-up and password change
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Argon2 cost for newly hashed passwords
    #[serde(default)]
    pub password_hashing: HashParams,

    /// Default log filter when `TRACKER_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Timestamp format for terminal output (strftime)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_min_password_length() -> usize {
    6
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backend: Backend::default(),
            min_password_length: default_min_password_length(),
            password_hashing: HashParams::default(),
            log_level: default_log_level(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    ///
    /// `TRACKER_BACKEND`, when set, overrides the stored backend.
    pub fn load_or_create(paths: &TrackerPaths) -> Result<Self, TrackerError> {
        let settings_path = paths.settings_file();

        let mut settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| TrackerError::Io(format!("Failed to read settings file: {}", e)))?;

            serde_json::from_str(&contents).map_err(|e| {
                TrackerError::Config(format!("Failed to parse settings file: {}", e))
            })?
        } else {
            Settings::default()
        };

        if !is_valid_date_format(&settings.date_format) {
            return Err(TrackerError::Config(format!(
                "Invalid date_format '{}' in settings file",
                settings.date_format
            )));
        }

        if let Ok(value) = std::env::var(BACKEND_ENV) {
            settings.backend = Backend::parse(&value).ok_or_else(|| {
                TrackerError::Config(format!(
                    "Invalid {} value '{}'. Use 'json' or 'memory'",
                    BACKEND_ENV, value
                ))
            })?;
        }

        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TrackerPaths) -> Result<(), TrackerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TrackerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| TrackerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.backend, Backend::Json);
        assert_eq!(settings.min_password_length, 6);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            min_password_length: 10,
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.min_password_length, 10);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"backend": "memory"}"#).unwrap();
        assert_eq!(settings.backend, Backend::Memory);
        assert_eq!(settings.min_password_length, 6);
        assert_eq!(settings.date_format, "%Y-%m-%d %H:%M");
    }

    #[test]
    fn test_invalid_date_format_is_rejected_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"date_format": "%Y-%Q"}"#).unwrap();

        let err = Settings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    #[test]
    fn test_date_format_check() {
        assert!(is_valid_date_format(DEFAULT_DATE_FORMAT));
        assert!(is_valid_date_format("%d.%m.%Y"));
        assert!(!is_valid_date_format("%Q"));
        assert!(!is_valid_date_format("%"));
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(Backend::parse("JSON"), Some(Backend::Json));
        assert_eq!(Backend::parse("in-memory"), Some(Backend::Memory));
        assert_eq!(Backend::parse("postgres"), None);
    }
}
