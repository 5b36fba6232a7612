use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use defect_tracker::cli::{
    handle_comment_command, handle_defect_command, handle_export_command,
    handle_project_command, handle_user_command, CommentCommands, DefectCommands,
    ExportCommands, ProjectCommands, UserCommands,
};
use defect_tracker::config::{
    paths::TrackerPaths,
    settings::{Backend, Settings},
};
use defect_tracker::display::format_role_matrix;
use defect_tracker::storage::{initialize_storage, Storage};

/// Environment variable holding the log filter
const LOG_ENV: &str = "TRACKER_LOG";

#[derive(Parser)]
#[command(
    name = "tracker",
    version,
    about = "Project and defect tracker",
    long_about = "Track projects and defects from the command line. \
                  Every action is checked against the signed-in user's role, and \
                  every edit is recorded in a per-field change history."
)]
struct Cli {
    /// Storage backend for this run (json or memory)
    #[arg(long, global = true, value_name = "BACKEND")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account and session commands
    #[command(subcommand)]
    User(UserCommands),

    /// Project management commands
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Defect management commands
    #[command(subcommand)]
    Defect(DefectCommands),

    /// Comment commands
    #[command(subcommand)]
    Comment(CommentCommands),

    /// Export data
    #[command(subcommand)]
    Export(ExportCommands),

    /// Show which permissions each role holds
    Roles,

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = TrackerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings);

    if let Some(backend) = &cli.backend {
        settings.backend = Backend::parse(backend)
            .ok_or_else(|| anyhow::anyhow!("Invalid backend '{}'. Use 'json' or 'memory'", backend))?;
    }

    let Some(command) = cli.command else {
        println!("Defect Tracker - projects and defects from the terminal");
        println!();
        println!("Run 'tracker --help' for usage information.");
        println!("Run 'tracker init' to set up a data directory.");
        return Ok(());
    };

    match command {
        Commands::Init => {
            println!("Initializing defect tracker at: {}", paths.base_dir().display());
            let created = initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete! ({} data files created)", created);
            println!();
            println!("Run 'tracker user sign-up <email> --name <name>' to create an account.");
        }
        Commands::Config => {
            println!("Defect Tracker Configuration");
            println!("============================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Backend:             {}", settings.backend);
            println!("  Min password length: {}", settings.min_password_length);
            println!("  Log level:           {}", settings.log_level);
            println!("  Date format:         {}", settings.date_format);
        }
        Commands::Roles => {
            print!("{}", format_role_matrix());
            println!();
        }
        command => {
            let storage = Storage::open(paths, &settings)?;
            match command {
                Commands::User(cmd) => handle_user_command(&storage, &settings, cmd)?,
                Commands::Project(cmd) => handle_project_command(&storage, &settings, cmd)?,
                Commands::Defect(cmd) => handle_defect_command(&storage, &settings, cmd)?,
                Commands::Comment(cmd) => handle_comment_command(&storage, &settings, cmd)?,
                Commands::Export(cmd) => handle_export_command(&storage, &settings, cmd)?,
                Commands::Init | Commands::Config | Commands::Roles => {}
            }
        }
    }

    Ok(())
}
