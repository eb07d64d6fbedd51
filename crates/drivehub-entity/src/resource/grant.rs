//! Share grants attached to resources.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Access level carried by a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// May read the resource and its descendants.
    #[default]
    Read,
    /// May also modify the resource and its descendants.
    Editor,
}

impl AccessLevel {
    /// Check if this level allows write operations.
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Editor)
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Editor => "editor",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = drivehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "editor" => Ok(Self::Editor),
            _ => Err(drivehub_core::AppError::invalid_operation(format!(
                "Invalid access level: '{s}'. Expected one of: read, editor"
            ))),
        }
    }
}

/// A (user, access level) pair enabling shared access to a resource and,
/// through inheritance, to everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The user receiving access.
    pub user_id: Uuid,
    /// The user's name at the time of sharing.
    pub username: String,
    /// The granted level.
    pub access_level: AccessLevel,
}

impl Grant {
    /// Create a new grant.
    pub fn new(user_id: Uuid, username: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            user_id,
            username: username.into(),
            access_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_editor_can_write() {
        assert!(AccessLevel::Editor.can_write());
        assert!(!AccessLevel::Read.can_write());
    }

    #[test]
    fn test_default_level_is_read() {
        assert_eq!(AccessLevel::default(), AccessLevel::Read);
        assert!("owner".parse::<AccessLevel>().is_err());
    }
}
