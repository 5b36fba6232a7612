//! User CLI commands
//!
//! Sign-up, sign-in/out and profile management. Passwords come from
//! `--password`/`TRACKER_PASSWORD` when given, otherwise from a hidden
//! prompt, and are held in zeroizing buffers either way.

use clap::Subcommand;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::display::{format_user_list, format_whoami};
use crate::error::{TrackerError, TrackerResult};
use crate::services::{AuthService, ProfileUpdate};
use crate::storage::Storage;

use super::parse_role;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account
    SignUp {
        /// Email address
        email: String,
        /// Full name
        #[arg(short, long)]
        name: String,
        /// Role (engineer, team_lead, manager, admin)
        #[arg(short, long, default_value = "engineer")]
        role: String,
        /// Password (prompted if omitted)
        #[arg(long, env = "TRACKER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign in and remember the session
    SignIn {
        /// Email address
        email: String,
        /// Password (prompted if omitted)
        #[arg(long, env = "TRACKER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out
    SignOut,
    /// Show the signed-in user and their permissions
    Whoami,
    /// List all users
    List,
    /// Update your own profile
    Update {
        /// New email address
        #[arg(short, long)]
        email: Option<String>,
        /// New full name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Change a user's role (needs manage_users)
    SetRole {
        /// User email or ID
        user: String,
        /// New role
        role: String,
    },
    /// Change your password
    Passwd {
        /// Current password (prompted if omitted)
        #[arg(long)]
        old: Option<String>,
        /// New password (prompted if omitted)
        #[arg(long)]
        new: Option<String>,
    },
}

/// Handle a user command
pub fn handle_user_command(
    storage: &Storage,
    settings: &Settings,
    cmd: UserCommands,
) -> TrackerResult<()> {
    let service = AuthService::new(storage, settings);

    match cmd {
        UserCommands::SignUp {
            email,
            name,
            role,
            password,
        } => {
            let role = parse_role(&role)?;
            let password = match password {
                Some(p) => Zeroizing::new(p),
                None => prompt_new_password()?,
            };

            let user = service.sign_up(&email, &password, &name, role)?;
            println!("Created user: {}", user);
            println!("  Role: {}", user.role.display_name());
            println!("  ID:   {}", user.id);
            println!();
            println!("Run 'tracker user sign-in {}' to start a session.", user.email);
        }

        UserCommands::SignIn { email, password } => {
            let password = match password {
                Some(p) => Zeroizing::new(p),
                None => prompt_password("Password: ")?,
            };

            let ctx = service.sign_in(&email, &password)?;
            if let Some(user) = ctx.user() {
                println!("Signed in as {} ({})", user, user.role.display_name());
            }
        }

        UserCommands::SignOut => {
            service.sign_out()?;
            println!("Signed out.");
        }

        UserCommands::Whoami => {
            let ctx = service.current()?;
            match ctx.user() {
                Some(user) => print!("{}", format_whoami(user)),
                None => println!("Not signed in."),
            }
        }

        UserCommands::List => {
            let ctx = service.current()?;
            print!("{}", format_user_list(&service.list_users(&ctx)?));
            println!();
        }

        UserCommands::Update { email, name } => {
            let ctx = service.current()?;
            let update = ProfileUpdate {
                email,
                full_name: name,
                role: None,
            };
            if update.is_empty() {
                println!("No changes specified. Use --email or --name.");
                return Ok(());
            }

            let user = service.update_profile(&ctx, &update)?;
            println!("Updated profile: {}", user);
        }

        UserCommands::SetRole { user, role } => {
            let ctx = service.current()?;
            let role = parse_role(&role)?;
            let target = service.resolve_user(&user)?;

            let updated = service.assign_role(&ctx, target.id, role)?;
            println!(
                "{} is now {}",
                updated.full_name,
                updated.role.display_name()
            );
        }

        UserCommands::Passwd { old, new } => {
            let ctx = service.current()?;
            let old = match old {
                Some(p) => Zeroizing::new(p),
                None => prompt_password("Current password: ")?,
            };
            let new = match new {
                Some(p) => Zeroizing::new(p),
                None => prompt_new_password()?,
            };

            service.change_password(&ctx, &old, &new)?;
            println!("Password changed.");
        }
    }

    Ok(())
}

/// Prompt for a password (hidden input)
fn prompt_password(prompt: &str) -> TrackerResult<Zeroizing<String>> {
    rpassword::prompt_password(prompt)
        .map(Zeroizing::new)
        .map_err(|e| TrackerError::Password(format!("Failed to read password: {}", e)))
}

/// Prompt for a new password with confirmation
fn prompt_new_password() -> TrackerResult<Zeroizing<String>> {
    let first = prompt_password("New password: ")?;
    let second = prompt_password("Confirm password: ")?;

    if *first != *second {
        return Err(TrackerError::Validation("Passwords do not match".into()));
    }

    Ok(first)
}
