//! Membership relation between one user and one group.

use super::{GroupId, MembershipRole, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A user's membership of a group.
///
/// `joined_at` is fixed when the membership is created; only the role can
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    group_id: GroupId,
    user_id: UserId,
    role: MembershipRole,
    joined_at: DateTime<Utc>,
}

impl Membership {
    /// Creates a membership stamped with the current clock time.
    #[must_use]
    pub fn new(
        group_id: GroupId,
        user_id: UserId,
        role: MembershipRole,
        clock: &impl Clock,
    ) -> Self {
        Self::from_persisted(group_id, user_id, role, clock.utc())
    }

    /// Reconstructs a membership from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        group_id: GroupId,
        user_id: UserId,
        role: MembershipRole,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            group_id,
            user_id,
            role,
            joined_at,
        }
    }

    /// Returns the group side of the relation.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Returns the user side of the relation.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the membership role.
    #[must_use]
    pub const fn role(&self) -> MembershipRole {
        self.role
    }

    /// Returns when the user joined the group.
    #[must_use]
    pub const fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Replaces the role, keeping the join timestamp.
    pub const fn change_role(&mut self, role: MembershipRole) {
        self.role = role;
    }
}
