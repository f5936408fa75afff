//! Group aggregate and its insertion payload.

use super::{GroupDomainError, GroupId, GroupName};
use serde::{Deserialize, Serialize};

const MAX_GROUP_TYPE_LENGTH: usize = 50;

/// A persisted group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    name: GroupName,
    description: Option<String>,
    group_type: String,
    thumbnail: Option<String>,
    is_active: bool,
}

/// Parameter object for reconstructing a persisted group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedGroupData {
    /// Store-assigned identifier.
    pub id: GroupId,
    /// Persisted name.
    pub name: GroupName,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted categorical label.
    pub group_type: String,
    /// Persisted thumbnail reference.
    pub thumbnail: Option<String>,
    /// Persisted lifecycle flag.
    pub is_active: bool,
}

impl Group {
    /// Reconstructs a group from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedGroupData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            description: data.description,
            group_type: data.group_type,
            thumbnail: data.thumbnail,
            is_active: data.is_active,
        }
    }

    /// Returns the group identifier.
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the group name.
    #[must_use]
    pub const fn name(&self) -> &GroupName {
        &self.name
    }

    /// Returns the optional free-text description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the categorical group label.
    #[must_use]
    pub fn group_type(&self) -> &str {
        &self.group_type
    }

    /// Returns the optional thumbnail reference.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    /// Returns whether the group is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Validated payload for inserting a group. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    name: GroupName,
    description: Option<String>,
    group_type: String,
    thumbnail: Option<String>,
    is_active: bool,
}

impl NewGroup {
    /// Creates an active group payload.
    ///
    /// # Errors
    ///
    /// Returns [`GroupDomainError`] when the name or type label is empty or
    /// exceeds its storage limit.
    pub fn new(
        name: impl Into<String>,
        group_type: impl Into<String>,
    ) -> Result<Self, GroupDomainError> {
        let group_name = GroupName::new(name)?;
        let raw_type = group_type.into();
        let trimmed_type = raw_type.trim();
        if trimmed_type.is_empty() {
            return Err(GroupDomainError::EmptyGroupType);
        }
        if trimmed_type.chars().count() > MAX_GROUP_TYPE_LENGTH {
            return Err(GroupDomainError::GroupTypeTooLong(trimmed_type.to_owned()));
        }
        Ok(Self {
            name: group_name,
            description: None,
            group_type: trimmed_type.to_owned(),
            thumbnail: None,
            is_active: true,
        })
    }

    /// Sets the description. Blank text is stored as no description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|text| !text.trim().is_empty());
        self
    }

    /// Sets the thumbnail reference. Blank references are dropped.
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail.filter(|uri| !uri.trim().is_empty());
        self
    }

    /// Sets the lifecycle flag.
    #[must_use]
    pub const fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Returns the group name.
    #[must_use]
    pub const fn name(&self) -> &GroupName {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the categorical group label.
    #[must_use]
    pub fn group_type(&self) -> &str {
        &self.group_type
    }

    /// Returns the optional thumbnail reference.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    /// Returns the lifecycle flag.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Materialises the persisted group once the store has assigned an id.
    #[must_use]
    pub fn into_group(self, id: GroupId) -> Group {
        Group::from_persisted(PersistedGroupData {
            id,
            name: self.name,
            description: self.description,
            group_type: self.group_type,
            thumbnail: self.thumbnail,
            is_active: self.is_active,
        })
    }
}
