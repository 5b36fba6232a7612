//! File I/O utilities with atomic writes
//!
//! Collection files are rewritten whole on every change. Writes go to a
//! sibling temp file that is synced and renamed over the target, so a crash
//! leaves either the old file or the new one, never a torn mix.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::TrackerError;

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Read JSON from a file, returning `T::default()` if the file doesn't exist
///
/// A file containing only `null` also yields the default, matching how a
/// cleared collection is written by older data directories.
pub fn read_json<T, P>(path: P) -> Result<T, TrackerError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| TrackerError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let value: Option<T> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| TrackerError::Storage(format!("Failed to parse {}: {}", path.display(), e)))?;

    Ok(value.unwrap_or_default())
}

/// Write JSON to a file atomically (write to temp, sync, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), TrackerError>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            TrackerError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = temp_path_for(path);

    let file = File::create(&temp_path)
        .map_err(|e| TrackerError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| TrackerError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| TrackerError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| TrackerError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        TrackerError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Check if a JSON file exists and parses
pub fn json_file_valid<P: AsRef<Path>>(path: P) -> bool {
    File::open(path.as_ref())
        .map(|file| serde_json::from_reader::<_, serde_json::Value>(BufReader::new(file)).is_ok())
        .unwrap_or(false)
}
