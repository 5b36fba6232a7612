//! Project CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_history, format_project_details, format_project_list};
use crate::error::TrackerResult;
use crate::models::{Defect, ProjectUpdate};
use crate::services::{AuthService, ProjectService};
use crate::storage::Storage;

use super::{parse_project_status, user_names};

/// Project subcommands
#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Status (active, on_hold, completed, archived)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// List all projects
    List,
    /// Show project details
    Show {
        /// Project name or ID
        project: String,
    },
    /// Edit a project
    Edit {
        /// Project name or ID
        project: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New status
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Delete a project with its defects, comments and history
    Delete {
        /// Project name or ID
        project: String,
        /// Skip the confirmation notice
        #[arg(short, long)]
        force: bool,
    },
    /// Show the change history of a project
    History {
        /// Project name or ID
        project: String,
    },
}

/// Handle a project command
pub fn handle_project_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ProjectCommands,
) -> TrackerResult<()> {
    let ctx = AuthService::new(storage, settings).current()?;
    let service = ProjectService::new(storage);

    match cmd {
        ProjectCommands::Create {
            name,
            description,
            status,
        } => {
            let status = status.as_deref().map(parse_project_status).transpose()?;
            let project = service.create(&ctx, &name, description.as_deref(), status)?;
            println!("Created project: {}", project.name);
            println!("  ID:     {}", project.id);
            println!("  Status: {}", project.status);
        }

        ProjectCommands::List => {
            let projects = service.list(&ctx)?;
            if projects.is_empty() {
                println!("No projects found. Create one with 'tracker project create'.");
            } else {
                print!("{}", format_project_list(&projects, &settings.date_format));
                println!();
            }
        }

        ProjectCommands::Show { project } => {
            let project = service.resolve(&ctx, &project)?;
            let defect_count = storage
                .defects
                .find(&|d: &Defect| d.project_id == project.id)?
                .len();
            print!(
                "{}",
                format_project_details(&project, defect_count, &settings.date_format)
            );
        }

        ProjectCommands::Edit {
            project,
            name,
            description,
            status,
        } => {
            let project = service.resolve(&ctx, &project)?;
            let update = ProjectUpdate {
                name,
                description,
                status: status.as_deref().map(parse_project_status).transpose()?,
            };
            if update.is_empty() {
                println!("No changes specified. Use --name, --description or --status.");
                return Ok(());
            }

            let updated = service.update(&ctx, project.id, &update)?;
            println!("Updated project: {}", updated.name);
        }

        ProjectCommands::Delete { project, force } => {
            let project = service.resolve(&ctx, &project)?;

            if !force {
                println!(
                    "This will delete project '{}' and every defect, comment and history entry in it.",
                    project.name
                );
                println!("To proceed, run again with --force flag:");
                println!("  tracker project delete {} --force", project.id);
                return Ok(());
            }

            let removed = service.delete(&ctx, project.id)?;
            println!("Deleted project: {}", project.name);
            println!(
                "  Removed {} defects, {} comments, {} history entries",
                removed.defects, removed.comments, removed.history
            );
        }

        ProjectCommands::History { project } => {
            let project = service.resolve(&ctx, &project)?;
            let entries = service.history(&ctx, project.id)?;
            println!("History for project: {}", project.name);
            println!();
            print!("{}", format_history(&entries, &user_names(storage)?));
        }
    }

    Ok(())
}
