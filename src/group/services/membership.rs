//! Service layer for group creation and membership management.
//!
//! Provides [`GroupMembershipService`], which validates requests, stamps
//! memberships from the injected clock, and bounds every store call with a
//! deadline.
//!
//! Reads are abandoned once their deadline passes. Writes hand a
//! [`WriteDeadline`] to the store, which must roll back before reporting
//! expiry, so a timed-out write never commits.

use crate::config::{OperationTimeouts, StoreConfig};
use crate::group::{
    domain::{
        Group, GroupDomainError, GroupId, GroupMember, MemberProfile, Membership, MembershipRole,
        NewGroup, UserId,
    },
    ports::{
        GroupRepository, GroupStoreError, GroupStoreResult, MembershipRepository, UserDirectory,
        WriteDeadline,
    },
};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Request payload for creating a group with its founding administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupRequest {
    name: String,
    group_type: String,
    description: Option<String>,
    thumbnail: Option<String>,
    is_active: bool,
}

impl CreateGroupRequest {
    /// Creates a request for an active group.
    #[must_use]
    pub fn new(name: impl Into<String>, group_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_type: group_type.into(),
            description: None,
            thumbnail: None,
            is_active: true,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the thumbnail reference.
    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Sets the lifecycle flag.
    #[must_use]
    pub const fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    fn into_new_group(self) -> Result<NewGroup, GroupDomainError> {
        let Self {
            name,
            group_type,
            description,
            thumbnail,
            is_active,
        } = self;
        Ok(NewGroup::new(name, group_type)?
            .with_description(description)
            .with_thumbnail(thumbnail)
            .with_active(is_active))
    }
}

/// Service-level errors for group and membership operations.
#[derive(Debug, Error)]
pub enum GroupServiceError {
    /// Input validation failed before the store was touched.
    #[error(transparent)]
    Validation(#[from] GroupDomainError),
    /// Store operation failed.
    #[error(transparent)]
    Store(#[from] GroupStoreError),
    /// The store did not answer within the operation deadline. A timed-out
    /// write left nothing behind.
    #[error("{operation} timed out after {limit:?}")]
    TimedOut {
        /// Name of the operation that timed out.
        operation: &'static str,
        /// Deadline that elapsed.
        limit: Duration,
    },
}

impl GroupServiceError {
    /// Returns `true` when the targeted group, membership, or user was
    /// absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::Store(err) => err.is_not_found(),
            Self::Validation(_) | Self::TimedOut { .. } => false,
        }
    }
}

/// Result type for group service operations.
pub type GroupServiceResult<T> = Result<T, GroupServiceError>;

/// Group creation and membership orchestration service.
///
/// The service is stateless: it holds shared handles to the store and the
/// clock and can be cloned freely across tasks.
#[derive(Clone)]
pub struct GroupMembershipService<S, C>
where
    S: GroupRepository + MembershipRepository + UserDirectory,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    timeouts: OperationTimeouts,
}

impl<S, C> GroupMembershipService<S, C>
where
    S: GroupRepository + MembershipRepository + UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a service with default operation deadlines.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            timeouts: OperationTimeouts::default(),
        }
    }

    /// Creates a service with the operation deadlines of `config`.
    #[must_use]
    pub fn from_config(store: Arc<S>, clock: Arc<C>, config: &StoreConfig) -> Self {
        Self::new(store, clock).with_timeouts(config.timeouts())
    }

    /// Overrides the operation deadlines.
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: OperationTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Creates a group and binds `creator` to it as administrator in one
    /// atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Validation`] for an invalid request,
    /// [`GroupServiceError::Store`] with
    /// [`GroupStoreError::CreationFailed`] when either insertion or the
    /// transaction fails (nothing is committed), or
    /// [`GroupServiceError::TimedOut`].
    pub async fn create_group_with_admin(
        &self,
        request: CreateGroupRequest,
        creator: UserId,
    ) -> GroupServiceResult<GroupId> {
        let group = request.into_new_group()?;
        let joined_at = self.clock.utc();
        let group_id = self
            .write(
                "create_group_with_admin",
                |deadline| self.store.create_with_admin(&group, creator, joined_at, deadline),
            )
            .await?;
        tracing::info!(
            group_id = %group_id,
            creator = %creator,
            name = %group.name(),
            "created group with administrator"
        );
        Ok(group_id)
    }

    /// Returns every group ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] when the lookup fails or
    /// [`GroupServiceError::TimedOut`].
    pub async fn list_groups(&self) -> GroupServiceResult<Vec<Group>> {
        self.read("list_groups", self.store.list_all()).await
    }

    /// Finds a group by identifier.
    ///
    /// Returns `Ok(None)` when the group does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] when the lookup fails or
    /// [`GroupServiceError::TimedOut`].
    pub async fn find_group(&self, id: GroupId) -> GroupServiceResult<Option<Group>> {
        self.read("find_group", self.store.find_by_id(id)).await
    }

    /// Deletes a group together with its memberships.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] with
    /// [`GroupStoreError::GroupNotFound`] when the group does not exist.
    pub async fn delete_group(&self, id: GroupId) -> GroupServiceResult<()> {
        self.write("delete_group", |deadline| self.store.delete(id, deadline))
            .await
            .inspect_err(|err| warn_if_missing(err, "delete_group"))?;
        tracing::info!(group_id = %id, "deleted group");
        Ok(())
    }

    /// Adds a user to a group as an ordinary member.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] when the membership already
    /// exists, the group or user is unknown to the store, or the store fails.
    pub async fn add_member(&self, group_id: GroupId, user_id: UserId) -> GroupServiceResult<()> {
        self.insert_membership(group_id, user_id, MembershipRole::Member)
            .await
    }

    /// Adds a user to a group with an explicit role.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Validation`] when `role` is not a known
    /// role, otherwise the errors of [`Self::add_member`].
    pub async fn add_member_with_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: &str,
    ) -> GroupServiceResult<()> {
        let parsed = parse_role(role)?;
        self.insert_membership(group_id, user_id, parsed).await
    }

    /// Removes a user from a group.
    ///
    /// Removing the last administrator is not prevented.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] with
    /// [`GroupStoreError::MembershipNotFound`] when the user is not a member.
    pub async fn remove_member(&self, group_id: GroupId, user_id: UserId) -> GroupServiceResult<()> {
        self.write("remove_member", |deadline| {
            self.store.remove(group_id, user_id, deadline)
        })
        .await
        .inspect_err(|err| warn_if_missing(err, "remove_member"))?;
        tracing::info!(group_id = %group_id, user_id = %user_id, "removed member");
        Ok(())
    }

    /// Changes the role of an existing member.
    ///
    /// The role is validated before the store is touched.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Validation`] when `role` is not a known
    /// role, or [`GroupServiceError::Store`] with
    /// [`GroupStoreError::MembershipNotFound`] when the user is not a member.
    pub async fn update_member_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: &str,
    ) -> GroupServiceResult<()> {
        let parsed = parse_role(role)?;
        self.write(
            "update_member_role",
            |deadline| self.store.update_role(group_id, user_id, parsed, deadline),
        )
        .await
        .inspect_err(|err| warn_if_missing(err, "update_member_role"))?;
        tracing::info!(
            group_id = %group_id,
            user_id = %user_id,
            role = %parsed,
            "changed member role"
        );
        Ok(())
    }

    /// Returns the profiles of every member of a group.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] when the lookup fails or
    /// [`GroupServiceError::TimedOut`].
    pub async fn list_members(&self, group_id: GroupId) -> GroupServiceResult<Vec<MemberProfile>> {
        self.read("list_members", self.store.list_members(group_id))
            .await
    }

    /// Returns every member of a group with role and join time.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] when the lookup fails or
    /// [`GroupServiceError::TimedOut`].
    pub async fn list_members_with_roles(
        &self,
        group_id: GroupId,
    ) -> GroupServiceResult<Vec<GroupMember>> {
        self.read(
            "list_members_with_roles",
            self.store.list_members_with_roles(group_id),
        )
        .await
    }

    /// Returns the role `user_id` holds in `group_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] with
    /// [`GroupStoreError::MembershipNotFound`] when the user is not a member.
    pub async fn member_role(
        &self,
        user_id: UserId,
        group_id: GroupId,
    ) -> GroupServiceResult<MembershipRole> {
        self.read("member_role", self.store.find_role(user_id, group_id))
            .await
    }

    /// Returns the groups a user belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] when the lookup fails or
    /// [`GroupServiceError::TimedOut`].
    pub async fn groups_for_user(&self, user_id: UserId) -> GroupServiceResult<Vec<Group>> {
        self.read("groups_for_user", self.store.list_groups_for_user(user_id))
            .await
    }

    /// Returns the role of the user known to the directory as
    /// `external_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GroupServiceError::Store`] with
    /// [`GroupStoreError::UserNotFound`] when the directory does not know the
    /// user, or [`GroupStoreError::MembershipNotFound`] when the user is not a
    /// member.
    pub async fn role_for_external_user(
        &self,
        external_id: &str,
        group_id: GroupId,
    ) -> GroupServiceResult<MembershipRole> {
        let user_id = self
            .read("find_user_id", self.store.find_user_id(external_id))
            .await?
            .ok_or_else(|| GroupStoreError::UserNotFound(external_id.to_owned()))?;
        self.member_role(user_id, group_id).await
    }

    async fn insert_membership(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: MembershipRole,
    ) -> GroupServiceResult<()> {
        let membership = Membership::new(group_id, user_id, role, &*self.clock);
        self.write("add_member", |deadline| self.store.add(&membership, deadline))
            .await?;
        tracing::info!(
            group_id = %group_id,
            user_id = %user_id,
            role = %role,
            "added member"
        );
        Ok(())
    }

    async fn read<T, F>(&self, operation: &'static str, call: F) -> GroupServiceResult<T>
    where
        F: Future<Output = GroupStoreResult<T>>,
    {
        tracing::debug!(operation, "store read");
        let limit = self.timeouts.read;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => Ok(result?),
            Err(_elapsed) => Err(timed_out(operation, limit)),
        }
    }

    async fn write<T, F, Fut>(&self, operation: &'static str, call: F) -> GroupServiceResult<T>
    where
        F: FnOnce(WriteDeadline) -> Fut,
        Fut: Future<Output = GroupStoreResult<T>>,
    {
        match call(WriteDeadline::starting_now(self.timeouts.write)).await {
            Err(GroupStoreError::DeadlineExceeded(limit)) => Err(timed_out(operation, limit)),
            result => Ok(result?),
        }
    }
}

fn timed_out(operation: &'static str, limit: Duration) -> GroupServiceError {
    tracing::warn!(operation, ?limit, "store call timed out");
    GroupServiceError::TimedOut { operation, limit }
}

fn parse_role(role: &str) -> Result<MembershipRole, GroupDomainError> {
    Ok(MembershipRole::try_from(role)?)
}

fn warn_if_missing(err: &GroupServiceError, operation: &'static str) {
    if err.is_not_found() {
        tracing::warn!(operation, error = %err, "targeted row not found");
    }
}
