//! In-memory group store for tests and local composition.
//!
//! Emulates the relational schema closely enough to exercise the service:
//! store-assigned ids, the `(group_id, user_id)` primary key, foreign keys
//! onto groups and users, cascading group deletion, and all-or-nothing group
//! creation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::group::{
    domain::{
        Group, GroupId, GroupMember, MemberProfile, Membership, MembershipRole, NewGroup, UserId,
    },
    ports::{
        CreationStep, GroupRepository, GroupStoreError, GroupStoreResult, MembershipRepository,
        UserDirectory, WriteDeadline, ensure_rows_affected,
    },
};

/// Constraint violation raised where a relational store would reject a row.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// The referenced group does not exist.
    #[error("group {0} does not exist")]
    UnknownGroup(GroupId),
    /// The referenced user does not exist.
    #[error("user {0} does not exist")]
    UnknownUser(UserId),
    /// A user with the same external identifier is already registered.
    #[error("external id '{0}' is already registered")]
    DuplicateExternalId(String),
}

/// Thread-safe in-memory group, membership, and user directory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGroupStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    last_group_id: i32,
    groups: BTreeMap<GroupId, Group>,
    memberships: BTreeMap<(GroupId, UserId), Membership>,
    users: BTreeMap<UserId, MemberProfile>,
}

impl InMemoryStoreState {
    fn insert_group(&mut self, group: &NewGroup) -> GroupId {
        self.last_group_id += 1;
        let id = GroupId::from_i32(self.last_group_id);
        self.groups.insert(id, group.clone().into_group(id));
        id
    }

    fn insert_membership(&mut self, membership: Membership) -> GroupStoreResult<()> {
        let group_id = membership.group_id();
        let user_id = membership.user_id();
        if !self.groups.contains_key(&group_id) {
            return Err(GroupStoreError::persistence(
                ConstraintViolation::UnknownGroup(group_id),
            ));
        }
        if !self.users.contains_key(&user_id) {
            return Err(GroupStoreError::persistence(
                ConstraintViolation::UnknownUser(user_id),
            ));
        }
        if self.memberships.contains_key(&(group_id, user_id)) {
            return Err(GroupStoreError::DuplicateMembership { group_id, user_id });
        }
        self.memberships.insert((group_id, user_id), membership);
        Ok(())
    }

    fn memberships_of(&self, group_id: GroupId) -> impl Iterator<Item = &Membership> {
        self.memberships
            .range((group_id, UserId::from_i32(i32::MIN))..=(group_id, UserId::from_i32(i32::MAX)))
            .map(|(_, membership)| membership)
    }
}

impl InMemoryGroupStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user in the emulated user directory.
    ///
    /// # Errors
    ///
    /// Returns [`GroupStoreError::Persistence`] when the external identifier
    /// is already registered or the lock is poisoned.
    pub fn register_user(&self, profile: MemberProfile) -> GroupStoreResult<()> {
        let mut state = self.write_state()?;
        let taken = state
            .users
            .values()
            .any(|existing| existing.external_id == profile.external_id);
        if taken {
            return Err(GroupStoreError::persistence(
                ConstraintViolation::DuplicateExternalId(profile.external_id),
            ));
        }
        state.users.insert(profile.id, profile);
        Ok(())
    }

    fn read_state(&self) -> GroupStoreResult<RwLockReadGuard<'_, InMemoryStoreState>> {
        self.state
            .read()
            .map_err(|err| GroupStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> GroupStoreResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        self.state
            .write()
            .map_err(|err| GroupStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupStore {
    async fn list_all(&self) -> GroupStoreResult<Vec<Group>> {
        let state = self.read_state()?;
        Ok(state.groups.values().cloned().collect())
    }

    async fn find_by_id(&self, id: GroupId) -> GroupStoreResult<Option<Group>> {
        let state = self.read_state()?;
        Ok(state.groups.get(&id).cloned())
    }

    async fn insert(&self, group: &NewGroup) -> GroupStoreResult<GroupId> {
        let mut state = self.write_state()?;
        Ok(state.insert_group(group))
    }

    async fn delete(&self, id: GroupId, deadline: WriteDeadline) -> GroupStoreResult<()> {
        ensure_within(deadline)?;
        let mut state = self.write_state()?;
        let removed = usize::from(state.groups.remove(&id).is_some());
        ensure_rows_affected(removed, || GroupStoreError::GroupNotFound(id))?;
        state.memberships.retain(|(group_id, _), _| *group_id != id);
        Ok(())
    }

    async fn create_with_admin(
        &self,
        group: &NewGroup,
        creator: UserId,
        joined_at: DateTime<Utc>,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<GroupId> {
        ensure_within(deadline)?;
        let mut state = self.write_state()?;
        let group_id = state.insert_group(group);
        let admin = Membership::from_persisted(group_id, creator, MembershipRole::Admin, joined_at);
        if let Err(err) = state.insert_membership(admin) {
            state.groups.remove(&group_id);
            return Err(GroupStoreError::creation_failed(
                CreationStep::InsertAdminMembership,
                err,
            ));
        }
        Ok(group_id)
    }
}

#[async_trait]
impl MembershipRepository for InMemoryGroupStore {
    async fn list_members(&self, group_id: GroupId) -> GroupStoreResult<Vec<MemberProfile>> {
        let state = self.read_state()?;
        let members = state
            .memberships_of(group_id)
            .filter_map(|membership| state.users.get(&membership.user_id()))
            .cloned()
            .collect();
        Ok(members)
    }

    async fn list_members_with_roles(
        &self,
        group_id: GroupId,
    ) -> GroupStoreResult<Vec<GroupMember>> {
        let state = self.read_state()?;
        let members = state
            .memberships_of(group_id)
            .filter_map(|membership| {
                state
                    .users
                    .get(&membership.user_id())
                    .map(|profile| GroupMember {
                        profile: profile.clone(),
                        role: membership.role(),
                        joined_at: membership.joined_at(),
                    })
            })
            .collect();
        Ok(members)
    }

    async fn find_role(
        &self,
        user_id: UserId,
        group_id: GroupId,
    ) -> GroupStoreResult<MembershipRole> {
        let state = self.read_state()?;
        state
            .memberships
            .get(&(group_id, user_id))
            .map(Membership::role)
            .ok_or(GroupStoreError::MembershipNotFound { group_id, user_id })
    }

    async fn add(
        &self,
        membership: &Membership,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<()> {
        ensure_within(deadline)?;
        let mut state = self.write_state()?;
        state.insert_membership(membership.clone())
    }

    async fn remove(
        &self,
        group_id: GroupId,
        user_id: UserId,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<()> {
        ensure_within(deadline)?;
        let mut state = self.write_state()?;
        let removed = usize::from(state.memberships.remove(&(group_id, user_id)).is_some());
        ensure_rows_affected(removed, || GroupStoreError::MembershipNotFound {
            group_id,
            user_id,
        })
    }

    async fn update_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: MembershipRole,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<()> {
        ensure_within(deadline)?;
        let mut state = self.write_state()?;
        let membership = state.memberships.get_mut(&(group_id, user_id));
        let updated = usize::from(membership.is_some());
        if let Some(existing) = membership {
            existing.change_role(role);
        }
        ensure_rows_affected(updated, || GroupStoreError::MembershipNotFound {
            group_id,
            user_id,
        })
    }

    async fn list_groups_for_user(&self, user_id: UserId) -> GroupStoreResult<Vec<Group>> {
        let state = self.read_state()?;
        let groups = state
            .memberships
            .keys()
            .filter(|(_, member)| *member == user_id)
            .filter_map(|(group_id, _)| state.groups.get(group_id))
            .cloned()
            .collect();
        Ok(groups)
    }
}

#[async_trait]
impl UserDirectory for InMemoryGroupStore {
    async fn find_user_id(&self, external_id: &str) -> GroupStoreResult<Option<UserId>> {
        let state = self.read_state()?;
        Ok(state
            .users
            .values()
            .find(|profile| profile.external_id == external_id)
            .map(|profile| profile.id))
    }
}

/// Mutations apply atomically under one lock; the deadline is checked before
/// taking it.
fn ensure_within(deadline: WriteDeadline) -> GroupStoreResult<()> {
    if deadline.is_expired() {
        return Err(GroupStoreError::DeadlineExceeded(deadline.limit()));
    }
    Ok(())
}
