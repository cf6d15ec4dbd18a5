//! Position → group table.
//!
//! Built once at process start and shared read-only. Lookups for unknown
//! positions return `None`; callers must treat that as "do nothing".

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Error building a position table.
#[derive(Debug, Error)]
pub enum PositionMapError {
    #[error("position table is empty")]
    Empty,

    #[error("position '{position}' has a blank name or group")]
    BlankEntry { position: String },

    #[error("failed to read position file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid position file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Immutable mapping from position name to group identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "BTreeMap<String, String>")]
pub struct PositionMap {
    entries: BTreeMap<String, String>,
}

impl PositionMap {
    /// Build a table, trimming names and rejecting blank entries.
    pub fn new<I, P, G>(entries: I) -> Result<Self, PositionMapError>
    where
        I: IntoIterator<Item = (P, G)>,
        P: Into<String>,
        G: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (position, group) in entries {
            let position = position.into().trim().to_string();
            let group = group.into().trim().to_string();
            if position.is_empty() || group.is_empty() {
                return Err(PositionMapError::BlankEntry { position });
            }
            map.insert(position, group);
        }

        if map.is_empty() {
            return Err(PositionMapError::Empty);
        }
        Ok(Self { entries: map })
    }

    /// Parse a YAML mapping of `position: group`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PositionMapError> {
        let entries: BTreeMap<String, String> = serde_yaml::from_str(yaml)?;
        Self::new(entries)
    }

    /// Load a YAML mapping of `position: group` from disk.
    pub fn from_yaml_file(path: &Path) -> Result<Self, PositionMapError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| PositionMapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Group for a position, or `None` if the position is unknown.
    #[must_use]
    pub fn group_for(&self, position: &str) -> Option<&str> {
        self.entries.get(position).map(String::as_str)
    }

    /// Every distinct group in the table, in name order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        self.entries
            .values()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// `(position, group)` pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, g)| (p.as_str(), g.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PositionMap {
    fn default() -> Self {
        let entries = [
            ("dev", "Developer-Team"),
            ("security", "Security-Team"),
            ("readonly", "Read-Only"),
        ]
        .into_iter()
        .map(|(p, g)| (p.to_string(), g.to_string()))
        .collect();
        Self { entries }
    }
}

impl From<PositionMap> for BTreeMap<String, String> {
    fn from(map: PositionMap) -> Self {
        map.entries
    }
}
