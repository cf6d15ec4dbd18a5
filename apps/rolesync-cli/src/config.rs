//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: a variable that is present but unparseable is an
//! error, never silently replaced by its default. Command-line flags are
//! applied on top with [`Config::apply_overrides`].

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rolesync_directory::scim::{ScimConfig, ScimCredentials};
use thiserror::Error;

pub const ENV_LOG: &str = "ROLESYNC_LOG";
pub const ENV_LOG_FORMAT: &str = "ROLESYNC_LOG_FORMAT";
pub const ENV_POSITIONS_FILE: &str = "ROLESYNC_POSITIONS_FILE";
pub const ENV_DIRECTORY: &str = "ROLESYNC_DIRECTORY";
pub const ENV_SCIM_URL: &str = "ROLESYNC_SCIM_URL";
pub const ENV_SCIM_TOKEN: &str = "ROLESYNC_SCIM_TOKEN";
pub const ENV_SCIM_TIMEOUT_SECS: &str = "ROLESYNC_SCIM_TIMEOUT_SECS";
pub const ENV_BUCKET_ROOT: &str = "ROLESYNC_BUCKET_ROOT";
pub const ENV_MEMORY_SEED: &str = "ROLESYNC_MEMORY_SEED";

const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_SCIM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(format!("expected 'json' or 'pretty', got '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Pretty => write!(f, "pretty"),
        }
    }
}

/// Which directory backend instructions are applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryKind {
    /// Process-local directory; nothing leaves the machine.
    #[default]
    Memory,
    /// SCIM 2.0 service.
    Scim,
}

impl FromStr for DirectoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "scim" => Ok(Self::Scim),
            other => Err(format!("expected 'memory' or 'scim', got '{other}'")),
        }
    }
}

impl fmt::Display for DirectoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Scim => write!(f, "scim"),
        }
    }
}

/// SCIM connection settings. Validated when the backend is built.
#[derive(Clone, Default)]
pub struct ScimSettings {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for ScimSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScimSettings")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Flag values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub log_filter: Option<String>,
    pub log_format: Option<LogFormat>,
    pub positions_file: Option<PathBuf>,
    pub directory: Option<DirectoryKind>,
    pub bucket_root: Option<PathBuf>,
    pub memory_seed: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Log filter directive; `RUST_LOG` still wins when set.
    pub log_filter: String,
    pub log_format: LogFormat,
    /// YAML position table. Built-in table when absent.
    pub positions_file: Option<PathBuf>,
    pub directory: DirectoryKind,
    pub scim: ScimSettings,
    /// Root of the filesystem object store used by `handle-event`.
    pub bucket_root: Option<PathBuf>,
    /// YAML `username: [group, ...]` file preloaded into the memory backend.
    pub memory_seed: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let log_format = match get(ENV_LOG_FORMAT) {
            Some(v) => parse_var(ENV_LOG_FORMAT, &v)?,
            None => LogFormat::default(),
        };

        let directory = match get(ENV_DIRECTORY) {
            Some(v) => parse_var(ENV_DIRECTORY, &v)?,
            None => DirectoryKind::default(),
        };

        let timeout_secs = match get(ENV_SCIM_TIMEOUT_SECS) {
            Some(v) => {
                let secs: u64 = v.trim().parse().map_err(|e| ConfigError::InvalidValue {
                    var: ENV_SCIM_TIMEOUT_SECS.to_string(),
                    message: format!("{e}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        var: ENV_SCIM_TIMEOUT_SECS.to_string(),
                        message: "must be greater than zero".to_string(),
                    });
                }
                secs
            }
            None => DEFAULT_SCIM_TIMEOUT_SECS,
        };

        Ok(Self {
            log_filter: get(ENV_LOG).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            log_format,
            positions_file: get(ENV_POSITIONS_FILE).map(PathBuf::from),
            directory,
            scim: ScimSettings {
                url: get(ENV_SCIM_URL),
                token: get(ENV_SCIM_TOKEN),
                timeout: Duration::from_secs(timeout_secs),
            },
            bucket_root: get(ENV_BUCKET_ROOT).map(PathBuf::from),
            memory_seed: get(ENV_MEMORY_SEED).map(PathBuf::from),
        })
    }

    /// Replace environment values with any flags given on the command line.
    #[must_use]
    pub fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(filter) = overrides.log_filter {
            self.log_filter = filter;
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        if let Some(path) = overrides.positions_file {
            self.positions_file = Some(path);
        }
        if let Some(kind) = overrides.directory {
            self.directory = kind;
        }
        if let Some(root) = overrides.bucket_root {
            self.bucket_root = Some(root);
        }
        if let Some(seed) = overrides.memory_seed {
            self.memory_seed = Some(seed);
        }
        self
    }

    /// SCIM backend settings, failing if the URL or token is missing.
    pub fn scim_config(&self) -> Result<ScimConfig, ConfigError> {
        let base_url = self
            .scim
            .url
            .clone()
            .ok_or_else(|| ConfigError::MissingVar(ENV_SCIM_URL.to_string()))?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: ENV_SCIM_URL.to_string(),
                message: "must be an http:// or https:// URL".to_string(),
            });
        }
        let token = self
            .scim
            .token
            .clone()
            .ok_or_else(|| ConfigError::MissingVar(ENV_SCIM_TOKEN.to_string()))?;

        Ok(ScimConfig {
            base_url,
            credentials: ScimCredentials::bearer(token),
            timeout: self.scim.timeout,
        })
    }

    /// Object store root for `handle-event`.
    pub fn bucket_root(&self) -> Result<PathBuf, ConfigError> {
        self.bucket_root
            .clone()
            .ok_or_else(|| ConfigError::MissingVar(ENV_BUCKET_ROOT.to_string()))
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(|message| ConfigError::InvalidValue {
        var: var.to_string(),
        message,
    })
}
