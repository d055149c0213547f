//! StreamCoach CLI — the main entry point.
//!
//! Commands:
//! - `onboard`     — Write the default config and a demo script
//! - `run`         — Watch the console (or a script) and deliver reminders
//! - `simulate`    — Replay a script in virtual time and print every decision
//! - `status`      — Show timers and context settings
//! - `doctor`      — Diagnose configuration problems
//! - `config`      — Validate, show, or locate the config file
//! - `completions` — Generate shell completions

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

mod commands;

#[derive(Parser)]
#[command(
    name = "streamcoach",
    about = "StreamCoach — self-care reminders that wait for a quiet moment",
    version,
    author
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.streamcoach/config.toml
    #[arg(long, global = true, env = "STREAMCOACH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Start coaching: read chat from the console or a script
    Run {
        /// Replay this script instead of reading stdin
        #[arg(short, long)]
        script: Option<PathBuf>,
    },

    /// Replay a script in virtual time
    Simulate {
        /// Script file (TOML)
        file: PathBuf,

        /// Override the tick interval in seconds
        #[arg(long)]
        tick: Option<u64>,
    },

    /// Show timers and context settings
    Status,

    /// Diagnose configuration problems
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the config file
    Validate,
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Config problems surface in the command itself; here only the log level matters
    let debug_logging = cli.verbose
        || commands::load_config(config_path)
            .map(|c| c.logging.debug)
            .unwrap_or(false);

    let filter = if debug_logging { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run(config_path).await?,
        Commands::Run { script } => commands::run::run(config_path, script).await?,
        Commands::Simulate { file, tick } => commands::simulate::run(config_path, &file, tick).await?,
        Commands::Status => commands::status::run(config_path).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
        Commands::Config { action } => match action {
            ConfigAction::Validate => commands::config_cmd::validate(config_path).await?,
            ConfigAction::Show => commands::config_cmd::show(config_path).await?,
            ConfigAction::Path => commands::config_cmd::path(config_path).await?,
        },
        Commands::Completions { shell } => commands::completions::run(shell)?,
    }

    Ok(())
}
