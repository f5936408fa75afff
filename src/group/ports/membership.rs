//! Repository port for the user/group membership relation.

use super::{GroupStoreResult, WriteDeadline};
use crate::group::domain::{
    Group, GroupId, GroupMember, MemberProfile, Membership, MembershipRole, UserId,
};
use async_trait::async_trait;

/// Membership persistence contract.
///
/// Mutations take a [`WriteDeadline`] and fail with
/// [`super::GroupStoreError::DeadlineExceeded`] when it expires before
/// their effect is committed.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Returns the profiles of every member of a group, ordered by user id.
    async fn list_members(&self, group_id: GroupId) -> GroupStoreResult<Vec<MemberProfile>>;

    /// Returns every member of a group with role and join time.
    async fn list_members_with_roles(
        &self,
        group_id: GroupId,
    ) -> GroupStoreResult<Vec<GroupMember>>;

    /// Returns the role a user holds in a group.
    ///
    /// # Errors
    ///
    /// Returns [`super::GroupStoreError::MembershipNotFound`] when the user is
    /// not a member.
    async fn find_role(
        &self,
        user_id: UserId,
        group_id: GroupId,
    ) -> GroupStoreResult<MembershipRole>;

    /// Inserts a membership row.
    ///
    /// # Errors
    ///
    /// Returns [`super::GroupStoreError::DuplicateMembership`] when the pair
    /// already exists, or [`super::GroupStoreError::Persistence`] when the
    /// group or user is unknown to the store or the store is unreachable.
    async fn add(
        &self,
        membership: &Membership,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<()>;

    /// Deletes a membership row.
    ///
    /// # Errors
    ///
    /// Returns [`super::GroupStoreError::MembershipNotFound`] when no row was
    /// deleted.
    async fn remove(
        &self,
        group_id: GroupId,
        user_id: UserId,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<()>;

    /// Replaces the role of an existing membership.
    ///
    /// # Errors
    ///
    /// Returns [`super::GroupStoreError::MembershipNotFound`] when no row was
    /// updated.
    async fn update_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: MembershipRole,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<()>;

    /// Returns the groups a user belongs to, ordered by group id.
    async fn list_groups_for_user(&self, user_id: UserId) -> GroupStoreResult<Vec<Group>>;
}
