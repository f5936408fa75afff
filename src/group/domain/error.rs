//! Error types for group domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing group domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GroupDomainError {
    /// The group name is empty after trimming.
    #[error("group name must not be empty")]
    EmptyGroupName,

    /// The group name exceeds the 100-character storage limit.
    #[error("group name exceeds 100 character limit: {0}")]
    GroupNameTooLong(String),

    /// The group type label is empty after trimming.
    #[error("group type must not be empty")]
    EmptyGroupType,

    /// The group type label exceeds the 50-character storage limit.
    #[error("group type exceeds 50 character limit: {0}")]
    GroupTypeTooLong(String),

    /// The requested membership role is outside the closed role set.
    #[error(transparent)]
    InvalidRole(#[from] ParseRoleError),
}

/// Error returned while parsing a membership role.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown membership role: {0}")]
pub struct ParseRoleError(pub String);
