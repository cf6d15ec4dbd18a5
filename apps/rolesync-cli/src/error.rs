//! CLI error types and exit codes

use std::path::PathBuf;

use thiserror::Error;

use rolesync_directory::error::DirectoryError;
use rolesync_reconciler::error::{BatchError, HandlerError};
use rolesync_reconciler::event::EventError;
use rolesync_reconciler::manifest::ManifestError;
use rolesync_reconciler::positions::PositionMapError;
use rolesync_reconciler::store::StoreError;

use crate::config::ConfigError;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Configuration error
/// - 3: Input error (event, object, manifest)
/// - 4: Directory failure
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Position table error: {0}")]
    Positions(#[from] PositionMapError),

    #[error("Invalid upload event: {0}")]
    Event(#[from] EventError),

    #[error("Could not fetch manifest: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid manifest: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Directory setup failed: {0}")]
    Directory(#[from] DirectoryError),

    #[error("{0}")]
    Batch(#[from] BatchError),

    #[error("Failed to read {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed file {path}: {message}")]
    Seed { path: PathBuf, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<HandlerError> for CliError {
    fn from(err: HandlerError) -> Self {
        match err {
            HandlerError::Event(e) => CliError::Event(e),
            HandlerError::Store(e) => CliError::Store(e),
            HandlerError::Manifest(e) => CliError::Manifest(e),
            HandlerError::Batch(e) => CliError::Batch(e),
        }
    }
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Positions(_) | CliError::Seed { .. } => 2,
            CliError::Event(_)
            | CliError::Store(_)
            | CliError::Manifest(_)
            | CliError::Input { .. } => 3,
            CliError::Directory(_) | CliError::Batch(_) => 4,
            CliError::Serialization(_) => 1,
        }
    }

    /// Print the error to stderr.
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {suggestion}");
            } else {
                eprintln!("\nSuggestion: {suggestion}");
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Batch(_) => Some(
                "Rows before the failing line were applied. Fix the cause and re-run the same manifest; applied rows are skipped as already satisfied.",
            ),
            CliError::Manifest(ManifestError::MissingColumn(_)) => {
                Some("The header row must name the columns: username, position, mode.")
            }
            CliError::Config(ConfigError::MissingVar(_)) => {
                Some("Set the variable in the environment or pass the matching flag.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::Config(ConfigError::MissingVar("ROLESYNC_SCIM_URL".to_string()))
                .exit_code(),
            2
        );
        assert_eq!(
            CliError::Manifest(ManifestError::MissingColumn("mode")).exit_code(),
            3
        );
        assert_eq!(
            CliError::Directory(DirectoryError::internal("x")).exit_code(),
            4
        );
        assert_eq!(
            CliError::Serialization(serde_json::from_str::<serde_json::Value>("{").unwrap_err())
                .exit_code(),
            1
        );
    }

    #[test]
    fn test_handler_errors_keep_their_category() {
        let err: CliError = HandlerError::Event(EventError::NoRecords).into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(
            err.to_string(),
            "Invalid upload event: upload event has no records"
        );
    }
}
