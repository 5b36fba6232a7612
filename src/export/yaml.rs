//! YAML Export functionality
//!
//! Exports the complete tracker database to YAML for human-readable review.

use std::io::Write;

use crate::access::AuthContext;
use crate::error::{TrackerError, TrackerResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

/// Export the full database to YAML format
pub fn export_full_yaml<W: Write>(
    storage: &Storage,
    ctx: &AuthContext,
    writer: &mut W,
) -> TrackerResult<()> {
    let export = FullExport::from_storage(storage, ctx)?;

    let header = format!(
        "# Defect Tracker Full Export\n# Generated: {}\n# App Version: {}\n\n",
        export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| TrackerError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| TrackerError::Export(e.to_string()))?;

    Ok(())
}

/// Read a YAML export back, checking its integrity
pub fn read_full_yaml(yaml_str: &str) -> TrackerResult<FullExport> {
    let export: FullExport = serde_yaml::from_str(yaml_str)
        .map_err(|e| TrackerError::Export(format!("Invalid export file: {}", e)))?;

    export.validate().map_err(TrackerError::Export)?;

    Ok(export)
}
