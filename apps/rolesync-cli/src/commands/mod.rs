//! CLI command implementations

pub mod apply;
pub mod handle_event;
pub mod positions;
pub mod validate;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rolesync_directory::prelude::*;
use rolesync_reconciler::batch::{BatchProcessor, BatchSummary};
use rolesync_reconciler::positions::PositionMap;
use rolesync_reconciler::reconciler::Reconciler;
use tracing::info;

use crate::config::{Config, DirectoryKind};
use crate::error::{CliError, CliResult};

/// Load the configured position table, or the built-in one.
pub fn load_positions(config: &Config) -> CliResult<PositionMap> {
    match &config.positions_file {
        Some(path) => Ok(PositionMap::from_yaml_file(path)?),
        None => Ok(PositionMap::default()),
    }
}

/// A reconciler bound to the configured directory backend.
pub struct Backend {
    processor: BatchProcessor,
    memory: Option<Arc<InMemoryDirectory>>,
}

impl Backend {
    /// Build the backend selected by `config`.
    pub fn from_config(config: &Config) -> CliResult<Self> {
        let positions = Arc::new(load_positions(config)?);

        let mut memory = None;
        let directory: Arc<dyn IdentityDirectory> = match config.directory {
            DirectoryKind::Memory => {
                let mut directory =
                    InMemoryDirectory::new("memory").with_groups(positions.groups());
                if let Some(seed) = &config.memory_seed {
                    for (username, groups) in load_seed(seed)? {
                        directory = directory.with_user(&username, groups);
                    }
                }
                let directory = Arc::new(directory);
                memory = Some(directory.clone());
                directory
            }
            DirectoryKind::Scim => Arc::new(ScimDirectory::new(&config.scim_config()?)?),
        };

        info!(
            directory = %directory.display_name(),
            positions = positions.len(),
            "Directory backend ready"
        );

        Ok(Self {
            processor: BatchProcessor::new(Reconciler::new(directory, positions)),
            memory,
        })
    }

    pub fn processor(&self) -> &BatchProcessor {
        &self.processor
    }

    /// Memory backend, when that is what runs.
    pub fn memory(&self) -> Option<&Arc<InMemoryDirectory>> {
        self.memory.as_ref()
    }

    /// Log the changes a memory-backed run would have made.
    pub async fn report_planned_changes(&self) {
        let Some(memory) = &self.memory else {
            return;
        };
        for call in memory.mutations().await {
            info!(
                op = %call.op,
                username = %call.username,
                group = call.group.as_deref().unwrap_or(""),
                "Planned directory change"
            );
        }
    }
}

/// Read a memory seed file: `username: [group, ...]`.
fn load_seed(path: &Path) -> CliResult<BTreeMap<String, Vec<String>>> {
    let body = std::fs::read_to_string(path).map_err(|source| CliError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    let seed: Option<BTreeMap<String, Vec<String>>> =
        serde_yaml::from_str(&body).map_err(|e| CliError::Seed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(seed.unwrap_or_default())
}

/// One-line run report written after a successful batch.
pub fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "{} rows: {} applied, {} already satisfied, {} unknown position, {} invalid mode",
        summary.total_rows,
        summary.applied,
        summary.already_satisfied,
        summary.skipped_unknown_position,
        summary.skipped_invalid_mode,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Write;

    fn memory_config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[tokio::test]
    async fn test_memory_backend_registers_position_groups() {
        let backend = Backend::from_config(&memory_config()).unwrap();
        let memory = backend.memory().unwrap();
        assert_eq!(memory.user_count().await, 0);
        assert!(backend.processor().reconciler().positions().group_for("dev").is_some());
    }

    #[tokio::test]
    async fn test_memory_backend_loads_seed() {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        writeln!(seed, "bob:\n  - Read-Only\ncarol: []").unwrap();

        let mut config = memory_config();
        config.memory_seed = Some(seed.path().to_path_buf());
        let backend = Backend::from_config(&config).unwrap();

        let memory = backend.memory().unwrap();
        assert_eq!(memory.groups_of("bob").await, vec!["Read-Only"]);
        assert!(memory.has_user("carol").await);
    }

    #[test]
    fn test_bad_seed_is_config_error() {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        writeln!(seed, "bob: Read-Only").unwrap();

        let mut config = memory_config();
        config.memory_seed = Some(seed.path().to_path_buf());
        let err = Backend::from_config(&config).err().unwrap();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_scim_backend_without_url_is_config_error() {
        let mut config = memory_config();
        config.directory = DirectoryKind::Scim;
        let err = Backend::from_config(&config).err().unwrap();
        assert!(matches!(err, CliError::Config(_)));
    }
}
