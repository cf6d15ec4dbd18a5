//! In-memory identity directory.
//!
//! Keeps users and group memberships in process, records every call in a
//! journal, and can be told to fail the next call of a given operation.
//! Used for dry runs and as the test double for the reconciler.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DirectoryError, DirectoryResult};
use crate::outcome::{DirectoryOp, MutationOutcome};
use crate::traits::{DirectoryUser, IdentityDirectory};

/// How the directory reports a request that is already satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictReporting {
    /// Raise `UserAlreadyExists` / `AlreadyMember` / `NotMember` /
    /// `UserNotFound` errors, the way IAM-style APIs do.
    #[default]
    Errors,
    /// Return `Ok(MutationOutcome::AlreadySatisfied)`.
    Outcomes,
}

/// One journaled directory call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCall {
    pub op: DirectoryOp,
    pub username: String,
    pub group: Option<String>,
    /// Whether the call changed directory state.
    pub applied: bool,
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: BTreeSet<String>,
    /// group -> members
    groups: BTreeMap<String, BTreeSet<String>>,
    journal: Vec<DirectoryCall>,
    faults: HashSet<DirectoryOp>,
}

impl DirectoryState {
    fn record(&mut self, op: DirectoryOp, username: &str, group: Option<&str>, applied: bool) {
        self.journal.push(DirectoryCall {
            op,
            username: username.to_string(),
            group: group.map(str::to_string),
            applied,
        });
    }

    fn take_fault(&mut self, op: DirectoryOp) -> DirectoryResult<()> {
        if self.faults.remove(&op) {
            return Err(DirectoryError::internal(format!("injected fault in {op}")));
        }
        Ok(())
    }

    fn groups_of(&self, username: &str) -> Vec<String> {
        self.groups
            .iter()
            .filter(|(_, members)| members.contains(username))
            .map(|(group, _)| group.clone())
            .collect()
    }
}

/// Identity directory held entirely in memory.
#[derive(Debug)]
pub struct InMemoryDirectory {
    name: String,
    reporting: ConflictReporting,
    state: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
    /// Create an empty directory with no users and no groups.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reporting: ConflictReporting::default(),
            state: RwLock::new(DirectoryState::default()),
        }
    }

    /// Register groups. Adding to an unregistered group fails with
    /// `GroupNotFound`, as it would against a real backend.
    #[must_use]
    pub fn with_groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.into_inner();
        for group in groups {
            state.groups.entry(group.into()).or_default();
        }
        Self {
            state: RwLock::new(state),
            ..self
        }
    }

    /// Seed a user with an initial set of memberships. Not journaled.
    #[must_use]
    pub fn with_user<I, S>(self, username: &str, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.into_inner();
        state.users.insert(username.to_string());
        for group in groups {
            state
                .groups
                .entry(group.into())
                .or_default()
                .insert(username.to_string());
        }
        Self {
            state: RwLock::new(state),
            ..self
        }
    }

    /// Choose how already-satisfied requests are reported.
    #[must_use]
    pub fn with_conflict_reporting(mut self, reporting: ConflictReporting) -> Self {
        self.reporting = reporting;
        self
    }

    /// Fail the next call of `op` with an internal error.
    pub async fn fail_next(&self, op: DirectoryOp) {
        self.state.write().await.faults.insert(op);
    }

    /// Whether a user exists.
    pub async fn has_user(&self, username: &str) -> bool {
        self.state.read().await.users.contains(username)
    }

    /// Groups the user currently belongs to, in name order.
    pub async fn groups_of(&self, username: &str) -> Vec<String> {
        self.state.read().await.groups_of(username)
    }

    /// Every call made so far, in order.
    pub async fn journal(&self) -> Vec<DirectoryCall> {
        self.state.read().await.journal.clone()
    }

    /// Calls that changed directory state, in order.
    pub async fn mutations(&self) -> Vec<DirectoryCall> {
        self.state
            .read()
            .await
            .journal
            .iter()
            .filter(|call| call.applied)
            .cloned()
            .collect()
    }

    /// Number of users in the directory.
    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    fn already(&self, err: DirectoryError) -> DirectoryResult<MutationOutcome> {
        match self.reporting {
            ConflictReporting::Errors => Err(err),
            ConflictReporting::Outcomes => Ok(MutationOutcome::AlreadySatisfied),
        }
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryDirectory {
    fn display_name(&self) -> &str {
        &self.name
    }

    async fn get_user(&self, username: &str) -> DirectoryResult<Option<DirectoryUser>> {
        let mut state = self.state.write().await;
        state.take_fault(DirectoryOp::GetUser)?;
        state.record(DirectoryOp::GetUser, username, None, false);

        Ok(state.users.contains(username).then(|| DirectoryUser {
            username: username.to_string(),
            id: username.to_string(),
        }))
    }

    async fn create_user(&self, username: &str) -> DirectoryResult<MutationOutcome> {
        let mut state = self.state.write().await;
        state.take_fault(DirectoryOp::CreateUser)?;

        let created = state.users.insert(username.to_string());
        state.record(DirectoryOp::CreateUser, username, None, created);
        drop(state);

        if created {
            debug!(directory = %self.name, username, "User created");
            Ok(MutationOutcome::Applied)
        } else {
            self.already(DirectoryError::UserAlreadyExists {
                username: username.to_string(),
            })
        }
    }

    async fn delete_user(&self, username: &str) -> DirectoryResult<MutationOutcome> {
        let mut state = self.state.write().await;
        state.take_fault(DirectoryOp::DeleteUser)?;

        if !state.users.contains(username) {
            state.record(DirectoryOp::DeleteUser, username, None, false);
            drop(state);
            return self.already(DirectoryError::UserNotFound {
                username: username.to_string(),
            });
        }

        let remaining = state.groups_of(username);
        if !remaining.is_empty() {
            state.record(DirectoryOp::DeleteUser, username, None, false);
            return Err(DirectoryError::DeleteConflict {
                username: username.to_string(),
                groups: remaining,
            });
        }

        state.users.remove(username);
        state.record(DirectoryOp::DeleteUser, username, None, true);
        debug!(directory = %self.name, username, "User deleted");
        Ok(MutationOutcome::Applied)
    }

    async fn add_user_to_group(
        &self,
        group: &str,
        username: &str,
    ) -> DirectoryResult<MutationOutcome> {
        let mut state = self.state.write().await;
        state.take_fault(DirectoryOp::AddToGroup)?;

        if !state.groups.contains_key(group) {
            state.record(DirectoryOp::AddToGroup, username, Some(group), false);
            return Err(DirectoryError::GroupNotFound {
                group: group.to_string(),
            });
        }
        if !state.users.contains(username) {
            state.record(DirectoryOp::AddToGroup, username, Some(group), false);
            return Err(DirectoryError::UserNotFound {
                username: username.to_string(),
            });
        }

        let added = state
            .groups
            .get_mut(group)
            .is_some_and(|members| members.insert(username.to_string()));
        state.record(DirectoryOp::AddToGroup, username, Some(group), added);
        drop(state);

        if added {
            debug!(directory = %self.name, username, group, "Membership added");
            Ok(MutationOutcome::Applied)
        } else {
            self.already(DirectoryError::AlreadyMember {
                username: username.to_string(),
                group: group.to_string(),
            })
        }
    }

    async fn remove_user_from_group(
        &self,
        group: &str,
        username: &str,
    ) -> DirectoryResult<MutationOutcome> {
        let mut state = self.state.write().await;
        state.take_fault(DirectoryOp::RemoveFromGroup)?;

        if !state.groups.contains_key(group) {
            state.record(DirectoryOp::RemoveFromGroup, username, Some(group), false);
            return Err(DirectoryError::GroupNotFound {
                group: group.to_string(),
            });
        }
        if !state.users.contains(username) {
            state.record(DirectoryOp::RemoveFromGroup, username, Some(group), false);
            drop(state);
            return self.already(DirectoryError::UserNotFound {
                username: username.to_string(),
            });
        }

        let removed = state
            .groups
            .get_mut(group)
            .is_some_and(|members| members.remove(username));
        state.record(DirectoryOp::RemoveFromGroup, username, Some(group), removed);
        drop(state);

        if removed {
            debug!(directory = %self.name, username, group, "Membership removed");
            Ok(MutationOutcome::Applied)
        } else {
            self.already(DirectoryError::NotMember {
                username: username.to_string(),
                group: group.to_string(),
            })
        }
    }
}
