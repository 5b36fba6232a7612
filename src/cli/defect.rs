//! Defect CLI commands

use clap::{Args, Subcommand};

use crate::access::AuthContext;
use crate::config::Settings;
use crate::display::{
    format_defect_details, format_defect_list, format_history, format_statistics,
};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{DefectFilter, DefectUpdate, UserId};
use crate::services::{AuthService, DefectService, NewDefect, ProjectService};
use crate::storage::Storage;

use super::{parse_date, parse_defect_status, parse_priority, user_names};

/// Filters shared by `defect list` and `export defects`
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Only defects in this project (name or ID)
    #[arg(short, long)]
    pub project: Option<String>,
    /// Only defects with this status
    #[arg(short, long)]
    pub status: Option<String>,
    /// Only defects with this priority
    #[arg(long)]
    pub priority: Option<String>,
    /// Only defects assigned to this user (email, ID, or "me")
    #[arg(short, long)]
    pub assignee: Option<String>,
    /// Text to look for in title or description
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    /// Resolve names and IDs into a filter
    pub fn to_filter(
        &self,
        storage: &Storage,
        settings: &Settings,
        ctx: &AuthContext,
    ) -> TrackerResult<DefectFilter> {
        let project_id = match &self.project {
            Some(p) => Some(ProjectService::new(storage).resolve(ctx, p)?.id),
            None => None,
        };
        let assigned_to = match &self.assignee {
            Some(a) => Some(resolve_assignee(storage, settings, ctx, a)?),
            None => None,
        };

        Ok(DefectFilter {
            project_id,
            status: self.status.as_deref().map(parse_defect_status).transpose()?,
            priority: self.priority.as_deref().map(parse_priority).transpose()?,
            assigned_to,
            search: self.search.clone(),
        })
    }
}

/// Defect subcommands
#[derive(Subcommand)]
pub enum DefectCommands {
    /// File a new defect
    Create {
        /// Project name or ID
        #[arg(short, long)]
        project: String,
        /// Short summary
        title: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
        /// Priority (low, medium, high, critical)
        #[arg(long)]
        priority: Option<String>,
        /// Initial status
        #[arg(short, long)]
        status: Option<String>,
        /// Assign to a user (email, ID, or "me")
        #[arg(short, long)]
        assignee: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List defects
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show defect details and comments
    Show {
        /// Defect ID (full or short)
        defect: String,
    },
    /// Edit a defect
    Edit {
        /// Defect ID (full or short)
        defect: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New status
        #[arg(short, long)]
        status: Option<String>,
        /// New priority
        #[arg(long)]
        priority: Option<String>,
        /// Move to another project (name or ID)
        #[arg(long)]
        project: Option<String>,
        /// Assign to a user (email, ID, or "me")
        #[arg(short, long, conflicts_with = "unassign")]
        assignee: Option<String>,
        /// Remove the assignee
        #[arg(long)]
        unassign: bool,
        /// New due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Delete a defect with its comments and history
    Delete {
        /// Defect ID (full or short)
        defect: String,
        /// Skip the confirmation notice
        #[arg(short, long)]
        force: bool,
    },
    /// Show the change history of a defect
    History {
        /// Defect ID (full or short)
        defect: String,
    },
    /// Show defect counts by status and priority
    Stats {
        /// Limit to one project (name or ID)
        #[arg(short, long)]
        project: Option<String>,
    },
}

/// Handle a defect command
pub fn handle_defect_command(
    storage: &Storage,
    settings: &Settings,
    cmd: DefectCommands,
) -> TrackerResult<()> {
    let ctx = AuthService::new(storage, settings).current()?;
    let service = DefectService::new(storage);
    let projects = ProjectService::new(storage);

    match cmd {
        DefectCommands::Create {
            project,
            title,
            description,
            priority,
            status,
            assignee,
            due,
        } => {
            let project = projects.resolve(&ctx, &project)?;
            let input = NewDefect {
                project_id: project.id,
                title,
                description: description.unwrap_or_default(),
                status: status.as_deref().map(parse_defect_status).transpose()?,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                assigned_to: assignee
                    .as_deref()
                    .map(|a| resolve_assignee(storage, settings, &ctx, a))
                    .transpose()?,
                due_date: due.as_deref().map(parse_date).transpose()?,
            };

            let defect = service.create(&ctx, input)?;
            println!("Filed defect: {}", defect.title);
            println!("  ID:       {}", defect.id);
            println!("  Project:  {}", project.name);
            println!("  Status:   {}", defect.status);
            println!("  Priority: {}", defect.priority);
        }

        DefectCommands::List { filter } => {
            let filter = filter.to_filter(storage, settings, &ctx)?;
            let defects = service.list(&ctx, &filter)?;
            if defects.is_empty() {
                println!("No defects found.");
            } else {
                let today = storage.now().date_naive();
                print!(
                    "{}",
                    format_defect_list(&defects, &user_names(storage)?, today)
                );
                println!();
                println!("{} defect(s)", defects.len());
            }
        }

        DefectCommands::Show { defect } => {
            let defect = service.resolve(&ctx, &defect)?;
            let project_name = storage
                .projects
                .get(defect.project_id)?
                .map(|p| p.name)
                .unwrap_or_else(|| "(unknown)".to_string());
            let comments = service.comments(&ctx, defect.id)?;
            print!(
                "{}",
                format_defect_details(
                    &defect,
                    &project_name,
                    &comments,
                    &user_names(storage)?,
                    &settings.date_format
                )
            );
        }

        DefectCommands::Edit {
            defect,
            title,
            description,
            status,
            priority,
            project,
            assignee,
            unassign,
            due,
            clear_due,
        } => {
            let defect = service.resolve(&ctx, &defect)?;

            let assigned_to = if unassign {
                Some(None)
            } else {
                match assignee {
                    Some(a) => Some(Some(resolve_assignee(storage, settings, &ctx, &a)?)),
                    None => None,
                }
            };
            let due_date = if clear_due {
                Some(None)
            } else {
                due.as_deref().map(parse_date).transpose()?.map(Some)
            };
            let project_id = match project {
                Some(p) => Some(projects.resolve(&ctx, &p)?.id),
                None => None,
            };

            let update = DefectUpdate {
                project_id,
                title,
                description,
                status: status.as_deref().map(parse_defect_status).transpose()?,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                assigned_to,
                due_date,
            };
            if update.is_empty() {
                println!("No changes specified. Run 'tracker defect edit --help' for options.");
                return Ok(());
            }

            let updated = service.update(&ctx, defect.id, &update)?;
            println!("Updated defect: {}", updated.title);
        }

        DefectCommands::Delete { defect, force } => {
            let defect = service.resolve(&ctx, &defect)?;

            if !force {
                println!(
                    "This will delete defect '{}' with its comments and history.",
                    defect.title
                );
                println!("To proceed, run again with --force flag:");
                println!("  tracker defect delete {} --force", defect.id);
                return Ok(());
            }

            let removed = service.delete(&ctx, defect.id)?;
            println!("Deleted defect: {}", defect.title);
            println!(
                "  Removed {} comments, {} history entries",
                removed.comments, removed.history
            );
        }

        DefectCommands::History { defect } => {
            let defect = service.resolve(&ctx, &defect)?;
            let entries = service.history(&ctx, defect.id)?;
            println!("History for defect: {}", defect.title);
            println!();
            print!("{}", format_history(&entries, &user_names(storage)?));
        }

        DefectCommands::Stats { project } => {
            let project = match project {
                Some(p) => Some(projects.resolve(&ctx, &p)?),
                None => None,
            };
            let stats = service.statistics(&ctx, project.as_ref().map(|p| p.id))?;
            if let Some(project) = &project {
                println!("Project: {}", project.name);
                println!();
            }
            print!("{}", format_statistics(&stats));
        }
    }

    Ok(())
}

/// Resolve an assignee argument; "me" is the signed-in user
fn resolve_assignee(
    storage: &Storage,
    settings: &Settings,
    ctx: &AuthContext,
    identifier: &str,
) -> TrackerResult<UserId> {
    if identifier.eq_ignore_ascii_case("me") {
        return ctx.user_id().ok_or(TrackerError::Unauthenticated);
    }
    Ok(AuthService::new(storage, settings)
        .resolve_user(identifier)?
        .id)
}
