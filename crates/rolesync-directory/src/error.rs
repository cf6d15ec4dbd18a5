//! Directory error types
//!
//! Errors carry enough context to be classified per operation: the same
//! condition (a missing user, say) is harmless while removing memberships
//! but fatal while adding one.

use thiserror::Error;

use crate::outcome::DirectoryOp;

/// Error that can occur during directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // State conflicts (usually idempotence cases)
    /// The user does not exist.
    #[error("user not found: {username}")]
    UserNotFound { username: String },

    /// The user already exists (create conflict).
    #[error("user already exists: {username}")]
    UserAlreadyExists { username: String },

    /// The user is already a member of the group.
    #[error("user {username} is already a member of {group}")]
    AlreadyMember { username: String, group: String },

    /// The user is not a member of the group.
    #[error("user {username} is not a member of {group}")]
    NotMember { username: String, group: String },

    /// The group does not exist in the directory.
    #[error("group not found: {group}")]
    GroupNotFound { group: String },

    /// The user still belongs to groups and cannot be deleted.
    #[error("user {username} still belongs to {} group(s)", groups.len())]
    DeleteConflict {
        username: String,
        groups: Vec<String>,
    },

    // Backend failures
    /// Credentials were rejected by the directory.
    #[error("directory rejected credentials: {message}")]
    Unauthorized { message: String },

    /// Non-success HTTP status not covered by a more specific variant.
    #[error("directory returned HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Request never produced a response.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response could not be understood.
    #[error("invalid directory response: {message}")]
    InvalidResponse { message: String },

    /// Backend configuration is unusable.
    #[error("invalid directory configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

/// Whether an error means "already in the desired state" for an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Idempotence case: swallow and log at info.
    Expected,
    /// Anything else: propagate and abort the batch.
    Unexpected,
}

impl DirectoryError {
    /// Classify this error in the context of the operation that raised it.
    pub fn classify(&self, op: DirectoryOp) -> ErrorClass {
        let expected = match (op, self) {
            (DirectoryOp::CreateUser, DirectoryError::UserAlreadyExists { .. })
            | (DirectoryOp::AddToGroup, DirectoryError::AlreadyMember { .. })
            | (DirectoryOp::RemoveFromGroup, DirectoryError::NotMember { .. })
            | (DirectoryOp::RemoveFromGroup, DirectoryError::UserNotFound { .. })
            | (DirectoryOp::DeleteUser, DirectoryError::UserNotFound { .. })
            | (DirectoryOp::GetUser, DirectoryError::UserNotFound { .. }) => true,
            _ => false,
        };

        if expected {
            ErrorClass::Expected
        } else {
            ErrorClass::Unexpected
        }
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::UserNotFound { .. } => "USER_NOT_FOUND",
            DirectoryError::UserAlreadyExists { .. } => "USER_EXISTS",
            DirectoryError::AlreadyMember { .. } => "ALREADY_MEMBER",
            DirectoryError::NotMember { .. } => "NOT_MEMBER",
            DirectoryError::GroupNotFound { .. } => "GROUP_NOT_FOUND",
            DirectoryError::DeleteConflict { .. } => "DELETE_CONFLICT",
            DirectoryError::Unauthorized { .. } => "UNAUTHORIZED",
            DirectoryError::Http { .. } => "HTTP_ERROR",
            DirectoryError::Transport { .. } => "TRANSPORT_ERROR",
            DirectoryError::InvalidResponse { .. } => "INVALID_RESPONSE",
            DirectoryError::InvalidConfiguration { .. } => "INVALID_CONFIG",
            DirectoryError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    // Convenience constructors

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        DirectoryError::Internal {
            message: message.into(),
        }
    }

    /// Create a transport error with source.
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        DirectoryError::InvalidResponse {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DirectoryError::invalid_response(err.to_string())
        } else {
            DirectoryError::transport_with_source("request failed", err)
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn not_member() -> DirectoryError {
        DirectoryError::NotMember {
            username: "alice".to_string(),
            group: "Read-Only".to_string(),
        }
    }

    #[test]
    fn test_expected_errors() {
        let cases = vec![
            (
                DirectoryOp::CreateUser,
                DirectoryError::UserAlreadyExists {
                    username: "alice".to_string(),
                },
            ),
            (
                DirectoryOp::AddToGroup,
                DirectoryError::AlreadyMember {
                    username: "alice".to_string(),
                    group: "Developer-Team".to_string(),
                },
            ),
            (DirectoryOp::RemoveFromGroup, not_member()),
            (
                DirectoryOp::DeleteUser,
                DirectoryError::UserNotFound {
                    username: "alice".to_string(),
                },
            ),
        ];

        for (op, err) in cases {
            assert_eq!(
                err.classify(op),
                ErrorClass::Expected,
                "Expected {} during {op} to be expected",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_unexpected_errors() {
        let cases = vec![
            (DirectoryOp::AddToGroup, not_member()),
            (
                DirectoryOp::AddToGroup,
                DirectoryError::UserNotFound {
                    username: "ghost".to_string(),
                },
            ),
            (
                DirectoryOp::DeleteUser,
                DirectoryError::DeleteConflict {
                    username: "alice".to_string(),
                    groups: vec!["Read-Only".to_string()],
                },
            ),
            (
                DirectoryOp::CreateUser,
                DirectoryError::Http {
                    status: 500,
                    detail: "boom".to_string(),
                },
            ),
            (DirectoryOp::GetUser, DirectoryError::internal("boom")),
        ];

        for (op, err) in cases {
            assert_eq!(
                err.classify(op),
                ErrorClass::Unexpected,
                "Expected {} during {op} to be unexpected",
                err.error_code()
            );
        }
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::DeleteConflict {
            username: "alice".to_string(),
            groups: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(err.to_string(), "user alice still belongs to 2 group(s)");

        let err = DirectoryError::Http {
            status: 503,
            detail: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "directory returned HTTP 503: maintenance");
    }

    #[test]
    fn test_error_with_source() {
        let source_err = std::io::Error::new(std::io::ErrorKind::Other, "reset");
        let err = DirectoryError::transport_with_source("failed", source_err);

        assert_eq!(err.error_code(), "TRANSPORT_ERROR");
        if let DirectoryError::Transport { source, .. } = &err {
            assert!(source.is_some());
        } else {
            panic!("Expected Transport variant");
        }
    }
}
