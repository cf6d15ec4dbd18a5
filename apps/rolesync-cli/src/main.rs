//! rolesync - converge directory group memberships to HR manifests
//!
//! Reads CSV manifests of `username,position,mode` rows and applies them to
//! an identity directory:
//! - `handle-event` processes the manifest named by an upload notification
//! - `apply` runs a local manifest file
//! - `validate` reports what a manifest would do without touching anything
//! - `positions` prints the position → group table in effect

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use rolesync_cli::commands;
use rolesync_cli::config::{Config, DirectoryKind, LogFormat, Overrides};
use rolesync_cli::error::CliResult;
use rolesync_cli::logging::init_logging;

/// rolesync - position-driven group membership reconciliation
#[derive(Parser)]
#[command(name = "rolesync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log filter directive (overrides ROLESYNC_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format: json or pretty (overrides ROLESYNC_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// YAML position table (overrides ROLESYNC_POSITIONS_FILE)
    #[arg(long, global = true)]
    positions: Option<PathBuf>,

    /// Directory backend: memory or scim (overrides ROLESYNC_DIRECTORY)
    #[arg(long, global = true)]
    directory: Option<DirectoryKind>,

    /// Object store root for handle-event (overrides ROLESYNC_BUCKET_ROOT)
    #[arg(long, global = true)]
    bucket_root: Option<PathBuf>,

    /// Users preloaded into the memory backend (overrides ROLESYNC_MEMORY_SEED)
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process the manifest announced by an upload event
    HandleEvent(commands::handle_event::HandleEventArgs),

    /// Apply a local manifest file
    Apply(commands::apply::ApplyArgs),

    /// Report what a manifest would do, without directory calls
    Validate(commands::validate::ValidateArgs),

    /// Print the position → group table
    Positions(commands::positions::PositionsArgs),
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            log_filter: self.log_level.clone(),
            log_format: self.log_format,
            positions_file: self.positions.clone(),
            directory: self.directory,
            bucket_root: self.bucket_root.clone(),
            memory_seed: self.seed.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "rolesync failed");
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = Config::from_env()?.apply_overrides(cli.overrides());
    init_logging(&config.log_filter, config.log_format);

    match cli.command {
        Commands::HandleEvent(args) => commands::handle_event::execute(args, &config).await,
        Commands::Apply(args) => commands::apply::execute(args, &config).await,
        Commands::Validate(args) => commands::validate::execute(args, &config),
        Commands::Positions(args) => commands::positions::execute(args, &config),
    }
}
