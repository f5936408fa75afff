//! `PostgreSQL` repository implementation for groups and memberships.

use super::{
    models::{GroupRow, NewGroupRow, NewMembershipRow, UserRow},
    schema::{group_membership, groups, users},
};
use crate::config::StoreConfig;
use crate::group::{
    domain::{
        Group, GroupId, GroupMember, GroupName, MemberProfile, Membership, MembershipRole,
        NewGroup, PersistedGroupData, UserId,
    },
    ports::{
        CreationStep, GroupRepository, GroupStoreError, GroupStoreResult, MembershipRepository,
        UserDirectory, WriteDeadline, ensure_rows_affected,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by group adapters.
pub type GroupPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed group, membership, and user directory store.
///
/// The pool is owned by the hosting application and shared by reference
/// count; the store never mutates it. Blocking Diesel calls run on
/// [`tokio::task::spawn_blocking`].
///
/// Writes run in their own transaction with `statement_timeout` set to what
/// remains of their [`WriteDeadline`], so an expired write is cancelled and
/// rolled back by the server before the error is returned.
#[derive(Debug, Clone)]
pub struct PostgresGroupStore {
    pool: GroupPgPool,
}

impl PostgresGroupStore {
    /// Creates a store from an existing connection pool.
    #[must_use]
    pub const fn new(pool: GroupPgPool) -> Self {
        Self { pool }
    }

    /// Builds a connection pool from configuration and wraps it in a store.
    ///
    /// This establishes the pool's initial connections and therefore
    /// blocks.
    ///
    /// # Errors
    ///
    /// Returns [`GroupStoreError::Persistence`] when the pool cannot be
    /// built.
    pub fn connect(config: &StoreConfig) -> GroupStoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(config.database_url());
        let pool = Pool::builder()
            .max_size(config.pool_max_size())
            .connection_timeout(config.pool_connection_timeout())
            .build(manager)
            .map_err(GroupStoreError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> GroupStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> GroupStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(GroupStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(GroupStoreError::persistence)?
    }

    async fn run_write<F, T>(
        &self,
        deadline: WriteDeadline,
        query_failed: fn(DieselError) -> GroupStoreError,
        f: F,
    ) -> GroupStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, WriteError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let exceeded = || GroupStoreError::DeadlineExceeded(deadline.limit());
            if deadline.is_expired() {
                return Err(exceeded());
            }
            let mut connection = pool.get_timeout(deadline.remaining()).map_err(|err| {
                if deadline.is_expired() {
                    exceeded()
                } else {
                    GroupStoreError::persistence(err)
                }
            })?;
            connection
                .transaction::<_, WriteError, _>(|tx_conn| {
                    limit_statements(tx_conn, deadline)?;
                    f(tx_conn)
                })
                .map_err(|err| err.into_store_error(deadline, query_failed))
        })
        .await
        .map_err(GroupStoreError::persistence)?
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupStore {
    async fn list_all(&self) -> GroupStoreResult<Vec<Group>> {
        self.run_blocking(move |connection| {
            let rows = groups::table
                .order(groups::id.asc())
                .select(GroupRow::as_select())
                .load::<GroupRow>(connection)
                .map_err(GroupStoreError::persistence)?;
            rows.into_iter().map(row_to_group).collect()
        })
        .await
    }

    async fn find_by_id(&self, id: GroupId) -> GroupStoreResult<Option<Group>> {
        self.run_blocking(move |connection| {
            let row = groups::table
                .filter(groups::id.eq(id.into_inner()))
                .select(GroupRow::as_select())
                .first::<GroupRow>(connection)
                .optional()
                .map_err(GroupStoreError::persistence)?;
            row.map(row_to_group).transpose()
        })
        .await
    }

    async fn insert(&self, group: &NewGroup) -> GroupStoreResult<GroupId> {
        let new_row = to_new_group_row(group);
        self.run_blocking(move |connection| {
            insert_group(connection, &new_row).map_err(GroupStoreError::persistence)
        })
        .await
    }

    async fn delete(&self, id: GroupId, deadline: WriteDeadline) -> GroupStoreResult<()> {
        self.run_write(deadline, GroupStoreError::persistence, move |connection| {
            let deleted = diesel::delete(groups::table.filter(groups::id.eq(id.into_inner())))
                .execute(connection)?;
            ensure_rows_affected(deleted, || GroupStoreError::GroupNotFound(id))
                .map_err(WriteError::Rejected)
        })
        .await
    }

    async fn create_with_admin(
        &self,
        group: &NewGroup,
        creator: UserId,
        joined_at: DateTime<Utc>,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<GroupId> {
        let new_row = to_new_group_row(group);
        self.run_write(
            deadline,
            |err| GroupStoreError::creation_failed(CreationStep::Transaction, err),
            move |connection| {
                let group_id = insert_group(connection, &new_row)
                    .map_err(|err| WriteError::Step(CreationStep::InsertGroup, err))?;
                let admin = NewMembershipRow {
                    group_id: group_id.into_inner(),
                    user_id: creator.into_inner(),
                    role: MembershipRole::Admin.as_str().to_owned(),
                    joined_at,
                };
                insert_membership(connection, &admin)
                    .map_err(|err| WriteError::Step(CreationStep::InsertAdminMembership, err))?;
                Ok(group_id)
            },
        )
        .await
    }
}

#[async_trait]
impl MembershipRepository for PostgresGroupStore {
    async fn list_members(&self, group_id: GroupId) -> GroupStoreResult<Vec<MemberProfile>> {
        self.run_blocking(move |connection| {
            let rows = users::table
                .inner_join(group_membership::table)
                .filter(group_membership::group_id.eq(group_id.into_inner()))
                .order(users::id.asc())
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(GroupStoreError::persistence)?;
            Ok(rows.into_iter().map(row_to_profile).collect())
        })
        .await
    }

    async fn list_members_with_roles(
        &self,
        group_id: GroupId,
    ) -> GroupStoreResult<Vec<GroupMember>> {
        self.run_blocking(move |connection| {
            let rows = users::table
                .inner_join(group_membership::table)
                .filter(group_membership::group_id.eq(group_id.into_inner()))
                .order(users::id.asc())
                .select((
                    UserRow::as_select(),
                    group_membership::role,
                    group_membership::joined_at,
                ))
                .load::<(UserRow, String, DateTime<Utc>)>(connection)
                .map_err(GroupStoreError::persistence)?;
            rows.into_iter()
                .map(|(user, role, joined_at)| {
                    Ok(GroupMember {
                        profile: row_to_profile(user),
                        role: parse_persisted_role(&role)?,
                        joined_at,
                    })
                })
                .collect()
        })
        .await
    }

    async fn find_role(
        &self,
        user_id: UserId,
        group_id: GroupId,
    ) -> GroupStoreResult<MembershipRole> {
        self.run_blocking(move |connection| {
            let role = membership_filter(group_id, user_id)
                .select(group_membership::role)
                .first::<String>(connection)
                .optional()
                .map_err(GroupStoreError::persistence)?
                .ok_or(GroupStoreError::MembershipNotFound { group_id, user_id })?;
            parse_persisted_role(&role)
        })
        .await
    }

    async fn add(
        &self,
        membership: &Membership,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<()> {
        let group_id = membership.group_id();
        let user_id = membership.user_id();
        let new_row = NewMembershipRow {
            group_id: group_id.into_inner(),
            user_id: user_id.into_inner(),
            role: membership.role().as_str().to_owned(),
            joined_at: membership.joined_at(),
        };

        self.run_write(deadline, GroupStoreError::persistence, move |connection| {
            insert_membership(connection, &new_row).map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    WriteError::Rejected(GroupStoreError::DuplicateMembership { group_id, user_id })
                }
                other => WriteError::Query(other),
            })
        })
        .await
    }

    async fn remove(
        &self,
        group_id: GroupId,
        user_id: UserId,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<()> {
        self.run_write(deadline, GroupStoreError::persistence, move |connection| {
            let deleted = diesel::delete(membership_filter(group_id, user_id)).execute(connection)?;
            ensure_rows_affected(deleted, || GroupStoreError::MembershipNotFound {
                group_id,
                user_id,
            })
            .map_err(WriteError::Rejected)
        })
        .await
    }

    async fn update_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: MembershipRole,
        deadline: WriteDeadline,
    ) -> GroupStoreResult<()> {
        self.run_write(deadline, GroupStoreError::persistence, move |connection| {
            let updated = diesel::update(membership_filter(group_id, user_id))
                .set(group_membership::role.eq(role.as_str()))
                .execute(connection)?;
            ensure_rows_affected(updated, || GroupStoreError::MembershipNotFound {
                group_id,
                user_id,
            })
            .map_err(WriteError::Rejected)
        })
        .await
    }

    async fn list_groups_for_user(&self, user_id: UserId) -> GroupStoreResult<Vec<Group>> {
        self.run_blocking(move |connection| {
            let rows = groups::table
                .inner_join(group_membership::table)
                .filter(group_membership::user_id.eq(user_id.into_inner()))
                .order(groups::id.asc())
                .select(GroupRow::as_select())
                .load::<GroupRow>(connection)
                .map_err(GroupStoreError::persistence)?;
            rows.into_iter().map(row_to_group).collect()
        })
        .await
    }
}

#[async_trait]
impl UserDirectory for PostgresGroupStore {
    async fn find_user_id(&self, external_id: &str) -> GroupStoreResult<Option<UserId>> {
        let external = external_id.to_owned();
        self.run_blocking(move |connection| {
            let id = users::table
                .filter(users::external_id.eq(&external))
                .select(users::id)
                .first::<i32>(connection)
                .optional()
                .map_err(GroupStoreError::persistence)?;
            Ok(id.map(UserId::from_i32))
        })
        .await
    }
}

/// Failure inside a write transaction.
///
/// Errors raised by Diesel outside a named creation step, including
/// beginning or committing the transaction, arrive through the `From`
/// conversion.
#[derive(Debug)]
enum WriteError {
    Query(DieselError),
    Step(CreationStep, DieselError),
    Rejected(GroupStoreError),
}

impl From<DieselError> for WriteError {
    fn from(err: DieselError) -> Self {
        Self::Query(err)
    }
}

impl WriteError {
    /// Classifies the failure once the transaction has been rolled back.
    ///
    /// A database failure after the deadline expired is the server
    /// cancelling the statement.
    fn into_store_error(
        self,
        deadline: WriteDeadline,
        query_failed: fn(DieselError) -> GroupStoreError,
    ) -> GroupStoreError {
        match self {
            Self::Rejected(err) => err,
            Self::Query(err) | Self::Step(_, err)
                if deadline.is_expired() || is_statement_timeout(&err) =>
            {
                GroupStoreError::DeadlineExceeded(deadline.limit())
            }
            Self::Query(err) => query_failed(err),
            Self::Step(step, err) => GroupStoreError::creation_failed(step, err),
        }
    }
}

fn is_statement_timeout(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(_, info) if info.message().contains("statement timeout")
    )
}

/// Bounds every following statement of the current transaction by what
/// remains of `deadline`.
fn limit_statements(connection: &mut PgConnection, deadline: WriteDeadline) -> QueryResult<()> {
    // Zero would disable the timeout.
    let millis = deadline.remaining().as_millis().max(1);
    diesel::sql_query(format!("SET LOCAL statement_timeout = {millis}")).execute(connection)?;
    Ok(())
}

/// Group insertion shared by standalone inserts and the creation transaction.
fn insert_group(connection: &mut PgConnection, row: &NewGroupRow) -> QueryResult<GroupId> {
    diesel::insert_into(groups::table)
        .values(row)
        .returning(groups::id)
        .get_result::<i32>(connection)
        .map(GroupId::from_i32)
}

fn insert_membership(connection: &mut PgConnection, row: &NewMembershipRow) -> QueryResult<()> {
    diesel::insert_into(group_membership::table)
        .values(row)
        .execute(connection)?;
    Ok(())
}

fn membership_filter(
    group_id: GroupId,
    user_id: UserId,
) -> diesel::dsl::Filter<
    diesel::dsl::Filter<
        group_membership::table,
        diesel::dsl::Eq<group_membership::group_id, i32>,
    >,
    diesel::dsl::Eq<group_membership::user_id, i32>,
> {
    group_membership::table
        .filter(group_membership::group_id.eq(group_id.into_inner()))
        .filter(group_membership::user_id.eq(user_id.into_inner()))
}

fn to_new_group_row(group: &NewGroup) -> NewGroupRow {
    NewGroupRow {
        name: group.name().as_str().to_owned(),
        description: group.description().map(str::to_owned),
        group_type: group.group_type().to_owned(),
        thumbnail: group.thumbnail().map(str::to_owned),
        is_active: group.is_active(),
    }
}

fn row_to_group(row: GroupRow) -> GroupStoreResult<Group> {
    let GroupRow {
        id,
        name,
        description,
        group_type,
        thumbnail,
        is_active,
    } = row;

    let parsed_name = GroupName::new(name).map_err(GroupStoreError::invalid_persisted_data)?;
    Ok(Group::from_persisted(PersistedGroupData {
        id: GroupId::from_i32(id),
        name: parsed_name,
        description,
        group_type,
        thumbnail,
        is_active,
    }))
}

fn row_to_profile(row: UserRow) -> MemberProfile {
    MemberProfile {
        id: UserId::from_i32(row.id),
        external_id: row.external_id,
        username: row.username,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
        default_group_id: row.default_group_id.map(GroupId::from_i32),
    }
}

fn parse_persisted_role(role: &str) -> GroupStoreResult<MembershipRole> {
    MembershipRole::try_from(role).map_err(GroupStoreError::invalid_persisted_data)
}
