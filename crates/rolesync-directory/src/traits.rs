//! Identity directory capability trait.

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::outcome::MutationOutcome;

/// A user as seen by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    /// Login name, the key rolesync addresses users by.
    pub username: String,
    /// Backend identifier (SCIM resource id, or the username for in-memory).
    pub id: String,
}

/// Identity backend that rolesync reconciles users and group memberships in.
///
/// Mutations may report "nothing to do" either as
/// `Ok(MutationOutcome::AlreadySatisfied)` or as an error that
/// [`DirectoryError::classify`](crate::error::DirectoryError::classify)
/// marks as expected. Callers settle both into the same outcome with
/// [`DirectoryOp::settle`](crate::outcome::DirectoryOp::settle).
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Get the display name for this directory instance.
    fn display_name(&self) -> &str;

    /// Look up a user by username.
    ///
    /// Returns `Ok(None)` when the user does not exist.
    async fn get_user(&self, username: &str) -> DirectoryResult<Option<DirectoryUser>>;

    /// Create a user.
    async fn create_user(&self, username: &str) -> DirectoryResult<MutationOutcome>;

    /// Delete a user.
    ///
    /// Backends may refuse to delete a user that still has memberships.
    async fn delete_user(&self, username: &str) -> DirectoryResult<MutationOutcome>;

    /// Add a user to a group.
    ///
    /// # Arguments
    /// * `group` - The group identity (display name)
    /// * `username` - The user to add
    async fn add_user_to_group(&self, group: &str, username: &str)
        -> DirectoryResult<MutationOutcome>;

    /// Remove a user from a group.
    ///
    /// # Arguments
    /// * `group` - The group identity (display name)
    /// * `username` - The user to remove
    async fn remove_user_from_group(
        &self,
        group: &str,
        username: &str,
    ) -> DirectoryResult<MutationOutcome>;
}
