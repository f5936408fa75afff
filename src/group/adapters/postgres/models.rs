//! Diesel row models for group and membership persistence.

use super::schema::{group_membership, groups, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for group records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GroupRow {
    /// Store-assigned group identifier.
    pub id: i32,
    /// Human-readable group label.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Categorical group label.
    pub group_type: String,
    /// Optional thumbnail reference.
    pub thumbnail: Option<String>,
    /// Lifecycle flag.
    pub is_active: bool,
}

/// Insert model for group records. The id is assigned by the store.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = groups)]
pub struct NewGroupRow {
    /// Human-readable group label.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Categorical group label.
    pub group_type: String,
    /// Optional thumbnail reference.
    pub thumbnail: Option<String>,
    /// Lifecycle flag.
    pub is_active: bool,
}

/// Insert model for membership records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = group_membership)]
pub struct NewMembershipRow {
    /// Referenced group.
    pub group_id: i32,
    /// Referenced user.
    pub user_id: i32,
    /// Canonical role string.
    pub role: String,
    /// Join timestamp.
    pub joined_at: DateTime<Utc>,
}

/// Query result row for user records joined through memberships.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Internal user key.
    pub id: i32,
    /// Identity-provider identifier.
    pub external_id: String,
    /// Login name.
    pub username: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Contact address.
    pub email: String,
    /// Account lifecycle flag.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Preselected group.
    pub default_group_id: Option<i32>,
}
