//! Membership reconciliation.
//!
//! Converges one user at a time to the state an [`Instruction`] describes.
//! Nothing about the user is cached between calls: existence is queried
//! and memberships are re-derived through idempotent directory calls, so
//! replaying an instruction is always safe.
//!
//! Directory results are settled per operation with
//! [`DirectoryOp::settle`]: "already in the desired state" becomes
//! [`MutationOutcome::AlreadySatisfied`], everything else is a
//! [`ReconcileError`] that the caller is expected to abort on.

use std::fmt;
use std::sync::Arc;

use rolesync_directory::error::{DirectoryResult, ErrorClass};
use rolesync_directory::outcome::{DirectoryOp, MutationOutcome};
use rolesync_directory::traits::IdentityDirectory;
use tracing::{error, info};

use crate::error::{ReconcileError, ReconcileResult};
use crate::instruction::{Instruction, Mode};
use crate::positions::PositionMap;

/// Why an instruction was skipped without touching the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Position is not in the position table.
    UnknownPosition(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownPosition(position) => write!(f, "unknown position '{position}'"),
        }
    }
}

/// What reconciling one instruction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// At least one directory mutation took effect.
    Applied,
    /// The user was already in the desired state.
    AlreadySatisfied,
    /// Nothing was attempted.
    Skipped { reason: SkipReason },
}

impl ReconcileOutcome {
    fn from_changed(changed: bool) -> Self {
        if changed {
            ReconcileOutcome::Applied
        } else {
            ReconcileOutcome::AlreadySatisfied
        }
    }
}

/// Reconciles users against an identity directory using a position table.
#[derive(Clone)]
pub struct Reconciler {
    directory: Arc<dyn IdentityDirectory>,
    positions: Arc<PositionMap>,
}

impl Reconciler {
    pub fn new(directory: Arc<dyn IdentityDirectory>, positions: Arc<PositionMap>) -> Self {
        Self {
            directory,
            positions,
        }
    }

    #[must_use]
    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    /// Dispatch an instruction to `add`, `remove` or `move`.
    pub async fn apply(&self, instruction: &Instruction) -> ReconcileResult<ReconcileOutcome> {
        match instruction.mode {
            Mode::Add => self.add(&instruction.username, &instruction.position).await,
            Mode::Remove => self.remove(&instruction.username).await,
            Mode::Move => self.move_user(&instruction.username, &instruction.position).await,
        }
    }

    /// Ensure the user exists and is a member of the position's group.
    ///
    /// Other memberships are left alone.
    pub async fn add(&self, username: &str, position: &str) -> ReconcileResult<ReconcileOutcome> {
        let Some(group) = self.resolve(position) else {
            return Ok(unknown_position(position));
        };
        let mut changed = false;

        if self.user_exists(username).await? {
            info!(username, "User already exists");
        } else {
            info!(username, "Creating user");
            let result = self.directory.create_user(username).await;
            changed |= self
                .settle(DirectoryOp::CreateUser, username, None, result)?
                .is_applied();
        }

        let result = self.directory.add_user_to_group(group, username).await;
        changed |= self
            .settle(DirectoryOp::AddToGroup, username, Some(group), result)?
            .is_applied();

        Ok(ReconcileOutcome::from_changed(changed))
    }

    /// Remove the user from every mapped group, then delete the user.
    ///
    /// A user that does not exist is left alone. Deletion is only attempted
    /// once every membership removal has settled.
    pub async fn remove(&self, username: &str) -> ReconcileResult<ReconcileOutcome> {
        if !self.user_exists(username).await? {
            info!(username, "User does not exist");
            return Ok(ReconcileOutcome::AlreadySatisfied);
        }

        let mut changed = self.strip_memberships(username, None).await?;

        let result = self.directory.delete_user(username).await;
        let deleted = self.settle(DirectoryOp::DeleteUser, username, None, result)?;
        if deleted.is_applied() {
            info!(username, "Deleted user");
        }
        changed |= deleted.is_applied();

        Ok(ReconcileOutcome::from_changed(changed))
    }

    /// Leave the user in exactly the position's group, out of every other
    /// mapped group.
    ///
    /// The user is not created if absent: the target add then fails with an
    /// unexpected `UserNotFound`.
    pub async fn move_user(
        &self,
        username: &str,
        position: &str,
    ) -> ReconcileResult<ReconcileOutcome> {
        let Some(new_group) = self.resolve(position) else {
            return Ok(unknown_position(position));
        };

        let mut changed = self.strip_memberships(username, Some(new_group)).await?;

        let result = self.directory.add_user_to_group(new_group, username).await;
        changed |= self
            .settle(DirectoryOp::AddToGroup, username, Some(new_group), result)?
            .is_applied();

        Ok(ReconcileOutcome::from_changed(changed))
    }

    fn resolve(&self, position: &str) -> Option<&str> {
        self.positions.group_for(position)
    }

    async fn user_exists(&self, username: &str) -> ReconcileResult<bool> {
        match self.directory.get_user(username).await {
            Ok(user) => Ok(user.is_some()),
            Err(err) if err.classify(DirectoryOp::GetUser) == ErrorClass::Expected => Ok(false),
            Err(err) => Err(ReconcileError::directory(
                DirectoryOp::GetUser,
                username,
                None,
                err,
            )),
        }
    }

    /// Remove the user from every mapped group except `keep`.
    /// Returns whether any membership was actually removed.
    async fn strip_memberships(
        &self,
        username: &str,
        keep: Option<&str>,
    ) -> ReconcileResult<bool> {
        let mut changed = false;
        for group in self.positions.groups() {
            if Some(group) == keep {
                continue;
            }
            let result = self.directory.remove_user_from_group(group, username).await;
            changed |= self
                .settle(DirectoryOp::RemoveFromGroup, username, Some(group), result)?
                .is_applied();
        }
        Ok(changed)
    }

    fn settle(
        &self,
        op: DirectoryOp,
        username: &str,
        group: Option<&str>,
        result: DirectoryResult<MutationOutcome>,
    ) -> ReconcileResult<MutationOutcome> {
        let outcome = op
            .settle(result)
            .map_err(|err| ReconcileError::directory(op, username, group, err))?;
        log_outcome(op, username, group, outcome);
        Ok(outcome)
    }
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("directory", &self.directory.display_name())
            .field("positions", &self.positions)
            .finish()
    }
}

fn unknown_position(position: &str) -> ReconcileOutcome {
    error!(position, "Invalid group: position is not mapped");
    ReconcileOutcome::Skipped {
        reason: SkipReason::UnknownPosition(position.to_string()),
    }
}

fn log_outcome(op: DirectoryOp, username: &str, group: Option<&str>, outcome: MutationOutcome) {
    let group = group.unwrap_or_default();
    match (op, outcome) {
        (DirectoryOp::CreateUser, MutationOutcome::AlreadySatisfied) => {
            info!(username, "User already exists");
        }
        (DirectoryOp::AddToGroup, MutationOutcome::Applied) => {
            info!(username, group, "Added user to group");
        }
        (DirectoryOp::AddToGroup, MutationOutcome::AlreadySatisfied) => {
            info!(username, group, "User already in group");
        }
        (DirectoryOp::RemoveFromGroup, MutationOutcome::Applied) => {
            info!(username, group, "Removed user from group");
        }
        (DirectoryOp::RemoveFromGroup, MutationOutcome::AlreadySatisfied) => {
            info!(username, group, "User not in group");
        }
        (DirectoryOp::DeleteUser, MutationOutcome::AlreadySatisfied) => {
            info!(username, "User already deleted");
        }
        _ => {}
    }
}
