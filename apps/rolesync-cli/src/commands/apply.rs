//! Apply a local manifest file

use std::path::{Path, PathBuf};

use clap::Args;
use rolesync_reconciler::batch::BatchSummary;
use rolesync_reconciler::handler::SUCCESS_MARKER;
use rolesync_reconciler::manifest::Manifest;
use tracing::info;

use super::{summary_line, Backend};
use crate::config::Config;
use crate::error::{CliError, CliResult};

/// Apply a CSV manifest from the local filesystem
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the manifest (columns: username, position, mode)
    #[arg(short = 'm', long = "manifest")]
    pub manifest: PathBuf,

    /// Print the run summary as JSON instead of the success marker
    #[arg(long)]
    pub json: bool,
}

/// Execute the apply command
pub async fn execute(args: ApplyArgs, config: &Config) -> CliResult<()> {
    let backend = Backend::from_config(config)?;
    let summary = run(&args.manifest, &backend).await?;
    backend.report_planned_changes().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        eprintln!("{}", summary_line(&summary));
        println!("{SUCCESS_MARKER}");
    }
    Ok(())
}

/// Parse the whole manifest, then run it against `backend`.
pub async fn run(path: &Path, backend: &Backend) -> CliResult<BatchSummary> {
    let manifest = read_manifest(path)?;
    info!(path = %path.display(), rows = manifest.len(), "Applying manifest");
    Ok(backend.processor().run(&manifest).await?)
}

pub(crate) fn read_manifest(path: &Path) -> CliResult<Manifest> {
    let body = std::fs::read(path).map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Manifest::parse(&body)?)
}
