//! Check a manifest without touching any directory

use std::path::PathBuf;

use clap::Args;
use rolesync_reconciler::instruction::Mode;
use rolesync_reconciler::manifest::Manifest;
use rolesync_reconciler::positions::PositionMap;
use serde::Serialize;

use super::{apply::read_manifest, load_positions};
use crate::config::Config;
use crate::error::CliResult;

/// Report what a manifest would do
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the manifest
    #[arg(short = 'm', long = "manifest")]
    pub manifest: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// A row the batch would skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub line: u64,
    pub username: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub total_rows: usize,
    pub add: usize,
    pub remove: usize,
    #[serde(rename = "move")]
    pub move_: usize,
    pub invalid_modes: Vec<RowIssue>,
    /// `add`/`move` rows whose position has no group. `remove` ignores
    /// the position, so those rows are never listed.
    pub unknown_positions: Vec<RowIssue>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.invalid_modes.is_empty() && self.unknown_positions.is_empty()
    }
}

/// Classify every row of `manifest` against `positions`.
pub fn validate(manifest: &Manifest, positions: &PositionMap) -> ValidationReport {
    let mut report = ValidationReport {
        total_rows: manifest.len(),
        ..ValidationReport::default()
    };

    for row in &manifest.rows {
        let issue = |value: &str| RowIssue {
            line: row.line,
            username: row.username.clone(),
            value: value.to_string(),
        };

        let mode = match row.mode.parse::<Mode>() {
            Ok(mode) => mode,
            Err(_) => {
                report.invalid_modes.push(issue(&row.mode));
                continue;
            }
        };

        match mode {
            Mode::Add => report.add += 1,
            Mode::Remove => report.remove += 1,
            Mode::Move => report.move_ += 1,
        }

        if mode != Mode::Remove && positions.group_for(&row.position).is_none() {
            report.unknown_positions.push(issue(&row.position));
        }
    }

    report
}

/// Execute the validate command
pub fn execute(args: ValidateArgs, config: &Config) -> CliResult<()> {
    let positions = load_positions(config)?;
    let manifest = read_manifest(&args.manifest)?;
    let report = validate(&manifest, &positions);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} rows: {} add, {} remove, {} move",
        report.total_rows, report.add, report.remove, report.move_
    );
    for issue in &report.invalid_modes {
        println!(
            "line {}: invalid mode '{}' for {}",
            issue.line, issue.value, issue.username
        );
    }
    for issue in &report.unknown_positions {
        println!(
            "line {}: unknown position '{}' for {}",
            issue.line, issue.value, issue.username
        );
    }
    if report.is_clean() {
        println!("OK");
    }
    Ok(())
}
