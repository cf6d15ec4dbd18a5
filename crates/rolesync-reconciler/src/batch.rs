//! Sequential manifest processing.
//!
//! Rows are applied strictly in order, one at a time. Rows with an unknown
//! mode or position are logged and skipped; the first unexpected directory
//! failure stops the batch and later rows are left for re-delivery.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::{BatchError, ReconcileError};
use crate::manifest::{Manifest, ManifestRow};
use crate::reconciler::{ReconcileOutcome, Reconciler};

/// Counters for one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total_rows: usize,
    pub applied: usize,
    pub already_satisfied: usize,
    pub skipped_unknown_position: usize,
    pub skipped_invalid_mode: usize,
}

impl BatchSummary {
    fn start(total_rows: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            total_rows,
            applied: 0,
            already_satisfied: 0,
            skipped_unknown_position: 0,
            skipped_invalid_mode: 0,
        }
    }

    fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    /// Rows that ran to completion, skipped ones included.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.applied
            + self.already_satisfied
            + self.skipped_unknown_position
            + self.skipped_invalid_mode
    }

    fn record(&mut self, outcome: &ReconcileOutcome) {
        match outcome {
            ReconcileOutcome::Applied => self.applied += 1,
            ReconcileOutcome::AlreadySatisfied => self.already_satisfied += 1,
            ReconcileOutcome::Skipped { .. } => self.skipped_unknown_position += 1,
        }
    }
}

/// Applies manifests through a [`Reconciler`].
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    reconciler: Reconciler,
}

impl BatchProcessor {
    pub fn new(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }

    #[must_use]
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Apply every row of a manifest in order.
    pub async fn run(&self, manifest: &Manifest) -> Result<BatchSummary, BatchError> {
        let mut summary = BatchSummary::start(manifest.len());
        info!(run_id = %summary.run_id, rows = manifest.len(), "Starting batch");

        for row in &manifest.rows {
            let span = info_span!("row", line = row.line, username = %row.username);
            let outcome = self.run_row(row).instrument(span).await;

            match outcome {
                Ok(Some(outcome)) => summary.record(&outcome),
                Ok(None) => summary.skipped_invalid_mode += 1,
                Err(source) => {
                    error!(
                        run_id = %summary.run_id,
                        line = row.line,
                        username = %row.username,
                        error = %source,
                        "Aborting batch on unexpected directory error"
                    );
                    return Err(BatchError {
                        line: row.line,
                        username: row.username.clone(),
                        summary: Box::new(summary.finish()),
                        source,
                    });
                }
            }
        }

        let summary = summary.finish();
        info!(
            run_id = %summary.run_id,
            applied = summary.applied,
            already_satisfied = summary.already_satisfied,
            skipped_unknown_position = summary.skipped_unknown_position,
            skipped_invalid_mode = summary.skipped_invalid_mode,
            "Batch complete"
        );
        Ok(summary)
    }

    /// `Ok(None)` means the row's mode was not recognised.
    async fn run_row(
        &self,
        row: &ManifestRow,
    ) -> Result<Option<ReconcileOutcome>, ReconcileError> {
        let instruction = match row.instruction() {
            Ok(instruction) => instruction,
            Err(err) => {
                error!(mode = %err.0, "Invalid operation");
                return Ok(None);
            }
        };

        self.reconciler.apply(&instruction).await.map(Some)
    }
}
