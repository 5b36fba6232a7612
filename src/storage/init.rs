//! Storage initialization
//!
//! First-run setup: create the directories and an empty array for every
//! collection file that does not exist yet. Existing files are never
//! touched.

use crate::config::paths::TrackerPaths;
use crate::error::TrackerError;

use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Returns how many collection files were created.
pub fn initialize_storage(paths: &TrackerPaths) -> Result<usize, TrackerError> {
    paths.ensure_directories()?;

    let mut created = 0;
    for path in paths.collection_files() {
        if !path.exists() {
            write_json_atomic(&path, &Vec::<serde_json::Value>::new())?;
            tracing::debug!(path = %path.display(), "created collection file");
            created += 1;
        }
    }

    Ok(created)
}

/// Check if any collection file is missing
pub fn needs_initialization(paths: &TrackerPaths) -> bool {
    paths.collection_files().iter().any(|path| !path.exists())
}
