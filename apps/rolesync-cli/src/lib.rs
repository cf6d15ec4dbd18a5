//! rolesync CLI internals.
//!
//! The binary in `main.rs` only parses flags and dispatches; everything it
//! calls lives here so integration tests can drive the same code paths.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, ConfigError, DirectoryKind, LogFormat, Overrides};
pub use error::{CliError, CliResult};
