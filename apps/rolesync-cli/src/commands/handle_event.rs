//! Handle an upload notification

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use rolesync_reconciler::batch::BatchSummary;
use rolesync_reconciler::handler::{ManifestHandler, SUCCESS_MARKER};
use rolesync_reconciler::store::FsObjectStore;

use super::{summary_line, Backend};
use crate::config::Config;
use crate::error::{CliError, CliResult};

/// Process the manifest announced by an upload event
#[derive(Args, Debug)]
pub struct HandleEventArgs {
    /// Event JSON file, or `-` for stdin
    #[arg(short = 'e', long = "event", default_value = "-")]
    pub event: PathBuf,
}

/// Execute the handle-event command
pub async fn execute(args: HandleEventArgs, config: &Config) -> CliResult<()> {
    let payload = read_event(&args.event)?;
    let backend = Backend::from_config(config)?;
    let summary = run(&payload, config, &backend).await?;
    backend.report_planned_changes().await;

    eprintln!("{}", summary_line(&summary));
    println!("{SUCCESS_MARKER}");
    Ok(())
}

/// Resolve the event against the filesystem bucket root and run it.
pub async fn run(payload: &str, config: &Config, backend: &Backend) -> CliResult<BatchSummary> {
    let store = Arc::new(FsObjectStore::new(config.bucket_root()?));
    let handler = ManifestHandler::new(store, backend.processor().clone());
    Ok(handler.handle_json(payload).await?)
}

fn read_event(path: &Path) -> CliResult<String> {
    let read_err = |source| CliError::Input {
        path: path.to_path_buf(),
        source,
    };

    if path == Path::new("-") {
        let mut payload = String::new();
        std::io::stdin()
            .read_to_string(&mut payload)
            .map_err(read_err)?;
        Ok(payload)
    } else {
        std::fs::read_to_string(path).map_err(read_err)
    }
}
