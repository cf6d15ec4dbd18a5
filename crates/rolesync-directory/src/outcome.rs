//! Mutation outcomes and the directory operation catalogue.

use std::fmt;

use crate::error::{DirectoryResult, ErrorClass};

/// Result of a mutating directory call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOutcome {
    /// The directory changed.
    Applied,
    /// The directory was already in the requested state.
    AlreadySatisfied,
}

impl MutationOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }

    #[must_use]
    pub fn is_already_satisfied(&self) -> bool {
        matches!(self, MutationOutcome::AlreadySatisfied)
    }
}

impl fmt::Display for MutationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationOutcome::Applied => write!(f, "applied"),
            MutationOutcome::AlreadySatisfied => write!(f, "already_satisfied"),
        }
    }
}

/// Operations exposed by an [`IdentityDirectory`](crate::traits::IdentityDirectory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DirectoryOp {
    GetUser,
    CreateUser,
    DeleteUser,
    AddToGroup,
    RemoveFromGroup,
}

impl DirectoryOp {
    /// Fold an expected error into [`MutationOutcome::AlreadySatisfied`].
    ///
    /// Backends differ in how they report "nothing to do": some return an
    /// outcome, others (IAM-style APIs) raise an error. After settling, the
    /// caller only sees errors of class [`ErrorClass::Unexpected`].
    /// Logging the swallowed case is left to the caller.
    pub fn settle(
        self,
        result: DirectoryResult<MutationOutcome>,
    ) -> DirectoryResult<MutationOutcome> {
        match result {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.classify(self) == ErrorClass::Expected => {
                Ok(MutationOutcome::AlreadySatisfied)
            }
            Err(err) => Err(err),
        }
    }
}

impl fmt::Display for DirectoryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryOp::GetUser => write!(f, "get_user"),
            DirectoryOp::CreateUser => write!(f, "create_user"),
            DirectoryOp::DeleteUser => write!(f, "delete_user"),
            DirectoryOp::AddToGroup => write!(f, "add_user_to_group"),
            DirectoryOp::RemoveFromGroup => write!(f, "remove_user_from_group"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectoryError;

    #[test]
    fn test_settle_passes_outcomes_through() {
        let settled = DirectoryOp::CreateUser.settle(Ok(MutationOutcome::Applied));
        assert_eq!(settled.unwrap(), MutationOutcome::Applied);
    }

    #[test]
    fn test_settle_swallows_expected_errors() {
        let err = DirectoryError::AlreadyMember {
            username: "alice".to_string(),
            group: "Developer-Team".to_string(),
        };
        let settled = DirectoryOp::AddToGroup.settle(Err(err));
        assert_eq!(settled.unwrap(), MutationOutcome::AlreadySatisfied);
    }

    #[test]
    fn test_settle_propagates_unexpected_errors() {
        let err = DirectoryError::GroupNotFound {
            group: "Ghost-Team".to_string(),
        };
        let settled = DirectoryOp::AddToGroup.settle(Err(err));
        assert!(matches!(
            settled,
            Err(DirectoryError::GroupNotFound { .. })
        ));
    }

    #[test]
    fn test_settle_is_operation_aware() {
        // A missing user is fine when removing, but not when adding.
        let missing = || DirectoryError::UserNotFound {
            username: "bob".to_string(),
        };
        assert!(DirectoryOp::RemoveFromGroup.settle(Err(missing())).is_ok());
        assert!(DirectoryOp::AddToGroup.settle(Err(missing())).is_err());
    }
}
