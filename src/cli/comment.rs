//! Comment CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_comment;
use crate::error::TrackerResult;
use crate::services::{AuthService, DefectService};
use crate::storage::Storage;

use super::user_names;

/// Comment subcommands
#[derive(Subcommand)]
pub enum CommentCommands {
    /// Comment on a defect
    Add {
        /// Defect ID (full or short)
        defect: String,
        /// Comment text
        content: String,
    },
    /// List comments on a defect, oldest first
    List {
        /// Defect ID (full or short)
        defect: String,
    },
    /// Delete a comment
    Delete {
        /// Comment ID (full or short)
        comment: String,
    },
}

/// Handle a comment command
pub fn handle_comment_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CommentCommands,
) -> TrackerResult<()> {
    let ctx = AuthService::new(storage, settings).current()?;
    let service = DefectService::new(storage);

    match cmd {
        CommentCommands::Add { defect, content } => {
            let defect = service.resolve(&ctx, &defect)?;
            let comment = service.add_comment(&ctx, defect.id, &content)?;
            println!("Added comment {} to '{}'", comment.id, defect.title);
        }

        CommentCommands::List { defect } => {
            let defect = service.resolve(&ctx, &defect)?;
            let comments = service.comments(&ctx, defect.id)?;
            if comments.is_empty() {
                println!("No comments on '{}'.", defect.title);
                return Ok(());
            }

            let names = user_names(storage)?;
            println!("Comments on '{}':", defect.title);
            for comment in &comments {
                print!("{}", format_comment(comment, &names, &settings.date_format));
            }
        }

        CommentCommands::Delete { comment } => {
            let comment = service.find_comment(&ctx, &comment)?;
            service.delete_comment(&ctx, comment.id)?;
            println!("Deleted comment {}", comment.id);
        }
    }

    Ok(())
}
