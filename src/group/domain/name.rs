//! Validated group name.

use super::GroupDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_GROUP_NAME_LENGTH: usize = 100;

/// Human-readable group label.
///
/// Names are trimmed and must be non-empty. Uniqueness is left to the store
/// schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupName(String);

impl GroupName {
    /// Creates a validated group name.
    ///
    /// # Errors
    ///
    /// Returns [`GroupDomainError::EmptyGroupName`] when the trimmed value is
    /// empty, or [`GroupDomainError::GroupNameTooLong`] when it exceeds 100
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, GroupDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GroupDomainError::EmptyGroupName);
        }
        if trimmed.chars().count() > MAX_GROUP_NAME_LENGTH {
            return Err(GroupDomainError::GroupNameTooLong(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GroupName {
    type Error = GroupDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupName> for String {
    fn from(value: GroupName) -> Self {
        value.0
    }
}
