//! CSV manifest parsing.
//!
//! A manifest has a header row naming at least `username`, `position` and
//! `mode`. Column order is free and extra columns are ignored. Every value
//! is whitespace-trimmed; no other validation happens here. A blank object
//! is a manifest with no rows.

use thiserror::Error;

use crate::instruction::{Instruction, Mode, UnknownMode};

pub const REQUIRED_COLUMNS: [&str; 3] = ["username", "position", "mode"];

/// UTF-8 BOM bytes.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Error reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("manifest is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One data row, trimmed but otherwise uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    /// 1-based line number (header = 1, first data row = 2).
    pub line: u64,
    pub username: String,
    pub position: String,
    pub mode: String,
}

impl ManifestRow {
    /// Interpret the row. Fails only on an unrecognised mode.
    pub fn instruction(&self) -> Result<Instruction, UnknownMode> {
        let mode: Mode = self.mode.parse()?;
        Ok(Instruction::new(
            self.username.clone(),
            self.position.clone(),
            mode,
        ))
    }
}

/// A parsed manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub rows: Vec<ManifestRow>,
}

impl Manifest {
    /// Decode and parse raw manifest bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ManifestError> {
        let data = strip_utf8_bom(data);
        let text = std::str::from_utf8(data)?;
        Self::parse_str(text)
    }

    /// Parse manifest text.
    pub fn parse_str(text: &str) -> Result<Self, ManifestError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let mut indices = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == name)
                .ok_or(ManifestError::MissingColumn(name))?;
        }
        let [username_idx, position_idx, mode_idx] = indices;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, csv::Position::line);
            let cell = |idx: usize| record.get(idx).unwrap_or_default().trim().to_string();

            rows.push(ManifestRow {
                line,
                username: cell(username_idx),
                position: cell(position_idx),
                mode: cell(mode_idx),
            });
        }

        Ok(Self { rows })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Strip UTF-8 BOM from the beginning of data if present.
fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}
