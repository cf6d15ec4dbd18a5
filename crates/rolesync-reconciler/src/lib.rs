//! # rolesync reconciler
//!
//! Applies CSV manifests of `add` / `remove` / `move` instructions to an
//! [`IdentityDirectory`](rolesync_directory::traits::IdentityDirectory),
//! converging each user's group memberships to the group their position
//! maps to.
//!
//! ## Crate Organization
//!
//! - [`positions`] - position → group table
//! - [`instruction`] - `Mode` and `Instruction`
//! - [`manifest`] - CSV manifest parsing
//! - [`reconciler`] - per-user reconciliation (`add`, `remove`, `move`)
//! - [`batch`] - ordered, fail-fast manifest processing
//! - [`event`] - upload notification parsing
//! - [`store`] - object store collaborator
//! - [`handler`] - event → store → manifest → batch wiring

pub mod batch;
pub mod error;
pub mod event;
pub mod handler;
pub mod instruction;
pub mod manifest;
pub mod positions;
pub mod reconciler;
pub mod store;

pub mod prelude {
    pub use crate::batch::{BatchProcessor, BatchSummary};
    pub use crate::error::{BatchError, HandlerError, ReconcileError, ReconcileResult};
    pub use crate::event::{EventError, UploadEvent};
    pub use crate::handler::{ManifestHandler, SUCCESS_MARKER};
    pub use crate::instruction::{Instruction, Mode, UnknownMode};
    pub use crate::manifest::{Manifest, ManifestError, ManifestRow};
    pub use crate::positions::{PositionMap, PositionMapError};
    pub use crate::reconciler::{ReconcileOutcome, Reconciler, SkipReason};
    pub use crate::store::{FsObjectStore, MemoryObjectStore, ObjectStore, StoreError};
}
