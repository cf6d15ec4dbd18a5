//! Desired-state instructions produced from manifest rows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a manifest row asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Ensure the user exists and belongs to the position's group.
    Add,
    /// Strip every mapped membership, then delete the user.
    Remove,
    /// Leave an existing user in exactly the position's group.
    Move,
}

impl Mode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Add => "add",
            Mode::Remove => "remove",
            Mode::Move => "move",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `mode` cell that is not one of `add`, `remove`, `move`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid operation: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for Mode {
    type Err = UnknownMode;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Mode::Add),
            "remove" => Ok(Mode::Remove),
            "move" => Ok(Mode::Move),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// One user's desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub username: String,
    /// Ignored for [`Mode::Remove`].
    pub position: String,
    pub mode: Mode,
}

impl Instruction {
    pub fn new(username: impl Into<String>, position: impl Into<String>, mode: Mode) -> Self {
        Self {
            username: username.into(),
            position: position.into(),
            mode,
        }
    }

    pub fn add(username: impl Into<String>, position: impl Into<String>) -> Self {
        Self::new(username, position, Mode::Add)
    }

    pub fn remove(username: impl Into<String>) -> Self {
        Self::new(username, "", Mode::Remove)
    }

    pub fn move_to(username: impl Into<String>, position: impl Into<String>) -> Self {
        Self::new(username, position, Mode::Move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("add".parse::<Mode>().unwrap(), Mode::Add);
        assert_eq!("remove".parse::<Mode>().unwrap(), Mode::Remove);
        assert_eq!("move".parse::<Mode>().unwrap(), Mode::Move);
    }

    #[test]
    fn test_mode_parsing_is_case_sensitive() {
        let err = "ADD".parse::<Mode>().unwrap_err();
        assert_eq!(err, UnknownMode("ADD".to_string()));
        assert_eq!(err.to_string(), "invalid operation: ADD");
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_serde_is_lowercase() {
        let json = serde_json::to_string(&Mode::Move).unwrap();
        assert_eq!(json, "\"move\"");
    }

    #[test]
    fn test_constructors() {
        let i = Instruction::remove("alice");
        assert_eq!(i.mode, Mode::Remove);
        assert!(i.position.is_empty());

        let i = Instruction::move_to("bob", "security");
        assert_eq!(i.mode, Mode::Move);
        assert_eq!(i.position, "security");
    }
}
