//! # Identity Directory
//!
//! Abstractions for the identity backend that rolesync reconciles against.
//!
//! A directory is anything that can answer "does this user exist" and apply
//! the four membership mutations rolesync needs:
//!
//! - [`IdentityDirectory`] - the capability trait every backend implements
//! - [`MutationOutcome`] - `Applied` vs `AlreadySatisfied`
//! - [`DirectoryError`] - backend failures, classified per operation into
//!   expected (idempotent) and unexpected
//!
//! Two backends ship with the crate:
//!
//! - [`memory::InMemoryDirectory`] - journaled, fault-injectable, used for
//!   dry runs and tests
//! - [`scim::ScimDirectory`] - SCIM 2.0 over HTTP
//!
//! ## Example
//!
//! ```ignore
//! use rolesync_directory::prelude::*;
//!
//! let directory = InMemoryDirectory::new("local").with_groups(["Developer-Team"]);
//! directory.create_user("alice").await?;
//! let outcome = directory.add_user_to_group("Developer-Team", "alice").await?;
//! assert!(outcome.is_applied());
//! ```

pub mod error;
pub mod memory;
pub mod outcome;
pub mod scim;
pub mod traits;

/// Prelude module for convenient imports.
///
/// ```
/// use rolesync_directory::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{DirectoryError, DirectoryResult, ErrorClass};
    pub use crate::memory::{ConflictReporting, DirectoryCall, InMemoryDirectory};
    pub use crate::outcome::{DirectoryOp, MutationOutcome};
    pub use crate::scim::{ScimConfig, ScimCredentials, ScimDirectory};
    pub use crate::traits::{DirectoryUser, IdentityDirectory};
}

// Re-export async_trait for directory implementors
pub use async_trait::async_trait;
