//! Repository port for the group lifecycle.

use super::{GroupStoreResult, WriteDeadline};
use crate::group::domain::{Group, GroupId, NewGroup, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Group persistence contract.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Returns every group ordered by identifier.
    async fn list_all(&self) -> GroupStoreResult<Vec<Group>>;

    /// Finds a group by identifier.
    ///
    /// Returns `None` when the group does not exist.
    async fn find_by_id(&self, id: GroupId) -> GroupStoreResult<Option<Group>>;

    /// Inserts a group row and returns the store-assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`super::GroupStoreError::Persistence`] on constraint
    /// violation or connectivity failure.
    async fn insert(&self, group: &NewGroup) -> GroupStoreResult<GroupId>;

    /// Deletes a group and, through the schema, its memberships.
    ///
    /// # Errors
    ///
    /// Returns [`super::GroupStoreError::GroupNotFound`] when no row was
    /// deleted, or [`super::GroupStoreError::DeadlineExceeded`] when
    /// `deadline` expired and nothing was deleted.
    async fn delete(&self, id: GroupId, deadline: WriteDeadline) -> GroupStoreResult<()>;

    /// Inserts a group and the creator's administrator membership as one
    /// atomic unit.
    ///
    /// Either both rows are committed or neither is.
    ///
    /// # Errors
    ///
    /// Returns [`super::GroupStoreError::CreationFailed`] naming the step
    /// that failed, or [`super::GroupStoreError::DeadlineExceeded`] when
    /// `deadline` expired before the commit.
    async fn create_with_admin(
        &self,
        group: &NewGroup,
        creator: UserId,
        joined_at: DateTime<Utc>,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<GroupId>;
}
