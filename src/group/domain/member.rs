//! Read models for users listed as group members.

use super::{GroupId, MembershipRole, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User record as held by the external user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    /// Internal user key referenced by memberships.
    pub id: UserId,
    /// Opaque identifier issued by the identity provider.
    pub external_id: String,
    /// Login name.
    pub username: String,
    /// Given name, when known.
    pub first_name: Option<String>,
    /// Family name, when known.
    pub last_name: Option<String>,
    /// Contact address.
    pub email: String,
    /// Whether the account is active.
    pub is_active: bool,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last profile update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Group preselected for the user, if any.
    pub default_group_id: Option<GroupId>,
}

/// A member of a group together with their role and join time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// The member's directory profile.
    pub profile: MemberProfile,
    /// The member's role in the group.
    pub role: MembershipRole,
    /// When the member joined the group.
    pub joined_at: DateTime<Utc>,
}
