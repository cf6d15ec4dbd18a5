//! Reconciliation error types.

use thiserror::Error;

use rolesync_directory::error::DirectoryError;
use rolesync_directory::outcome::DirectoryOp;

use crate::batch::BatchSummary;
use crate::event::EventError;
use crate::manifest::ManifestError;
use crate::store::StoreError;

/// Unexpected directory failure while reconciling one user.
///
/// Expected (idempotent) directory errors never reach this type; they are
/// settled into outcomes first.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("{op} failed for user {username}: {source}")]
    Directory {
        op: DirectoryOp,
        username: String,
        group: Option<String>,
        #[source]
        source: DirectoryError,
    },
}

impl ReconcileError {
    pub(crate) fn directory(
        op: DirectoryOp,
        username: &str,
        group: Option<&str>,
        source: DirectoryError,
    ) -> Self {
        ReconcileError::Directory {
            op,
            username: username.to_string(),
            group: group.map(str::to_string),
            source,
        }
    }

    /// The directory error underneath.
    pub fn directory_error(&self) -> &DirectoryError {
        match self {
            ReconcileError::Directory { source, .. } => source,
        }
    }
}

/// Result type for reconciliation.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// A batch stopped at a row because of an unexpected directory failure.
///
/// Rows before `line` were applied; rows after it were not attempted.
#[derive(Debug, Error)]
#[error("batch aborted at line {line} ({username}): {source}")]
pub struct BatchError {
    pub line: u64,
    pub username: String,
    /// Counters up to, but not including, the failed row.
    pub summary: Box<BatchSummary>,
    #[source]
    pub source: ReconcileError,
}

/// Failure handling an upload event end to end.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Batch(#[from] BatchError),
}
