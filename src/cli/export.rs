//! CLI commands for data export
//!
//! Provides commands for exporting data in various formats.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::config::Settings;
use crate::error::{TrackerError, TrackerResult};
use crate::export::{self, FullExport};
use crate::models::Permission;
use crate::services::AuthService;
use crate::storage::Storage;

use super::defect::FilterArgs;

/// Full export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-readable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export all data to a file
    All {
        /// Output file path
        output: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export defects to CSV
    Defects {
        /// Output file path
        output: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Check an export file's schema and references
    Verify {
        /// Export file (.json, .yaml or .yml)
        input: PathBuf,
    },

    /// Show export information without writing files
    Info,
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExportCommands,
) -> TrackerResult<()> {
    let ctx = AuthService::new(storage, settings).current()?;

    match cmd {
        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            ctx.require(Permission::ExportData)?;
            let mut writer = create_output(&output)?;

            match format {
                ExportFormat::Json => {
                    export::export_full_json(storage, &ctx, &mut writer, pretty)?
                }
                ExportFormat::Yaml => export::export_full_yaml(storage, &ctx, &mut writer)?,
            }
            writer
                .flush()
                .map_err(|e| TrackerError::Export(e.to_string()))?;

            println!("Full database exported to: {}", output.display());
        }

        ExportCommands::Defects { output, filter } => {
            ctx.require(Permission::ExportData)?;
            let filter = filter.to_filter(storage, settings, &ctx)?;
            let writer = create_output(&output)?;

            let count = export::export_defects_csv(storage, &ctx, &filter, writer)?;
            println!("Exported {} defects to: {}", count, output.display());
        }

        ExportCommands::Verify { input } => {
            let contents = fs::read_to_string(&input).map_err(|e| {
                TrackerError::Export(format!("Failed to read {}: {}", input.display(), e))
            })?;

            let is_yaml = input
                .extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
            let export = if is_yaml {
                export::read_full_yaml(&contents)?
            } else {
                export::read_full_json(&contents)?
            };

            println!("Export is valid: {}", input.display());
            print_summary(&export);
        }

        ExportCommands::Info => {
            let export = FullExport::from_storage(storage, &ctx)?;

            println!("Export Information");
            println!("==================\n");
            print_summary(&export);
        }
    }

    Ok(())
}

fn create_output(output: &Path) -> TrackerResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        TrackerError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

fn print_summary(export: &FullExport) {
    println!("Schema Version: {}", export.schema_version);
    println!("App Version:    {}", export.app_version);
    println!("Exported By:    {}", export.exported_by);
    println!();

    println!("Data Summary:");
    println!("  Users:     {}", export.metadata.user_count);
    println!("  Projects:  {}", export.metadata.project_count);
    println!("  Defects:   {}", export.metadata.defect_count);
    println!("  Comments:  {}", export.metadata.comment_count);
    println!("  History:   {}", export.metadata.history_count);
}
