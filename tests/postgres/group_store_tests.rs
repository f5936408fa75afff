//! `PostgreSQL` integration tests for group persistence and atomic creation.

use crate::postgres::helpers::{BoxError, StoreContext, context};
use chrono::Utc;
use roster::group::{
    domain::{GroupId, MembershipRole, NewGroup, UserId},
    ports::{CreationStep, GroupRepository, GroupStoreError, MembershipRepository, WriteDeadline},
    services::{CreateGroupRequest, GroupServiceError},
};
use rstest::rstest;
use std::time::Duration;

fn engineering() -> CreateGroupRequest {
    CreateGroupRequest::new("Engineering", "dept")
        .with_description("Builds things")
        .with_thumbnail("eng.png")
}

#[rstest]
fn postgres_create_group_with_admin(
    context: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let creator = UserId::from_i32(1);

    let group_id = ctx
        .rt
        .block_on(ctx.service.create_group_with_admin(engineering(), creator))?;

    let group = ctx
        .rt
        .block_on(ctx.service.find_group(group_id))?
        .expect("group should exist");
    assert_eq!(group.name().as_str(), "Engineering");
    assert_eq!(group.group_type(), "dept");
    assert_eq!(group.description(), Some("Builds things"));
    assert_eq!(group.thumbnail(), Some("eng.png"));
    assert!(group.is_active());

    let role = ctx.rt.block_on(ctx.service.member_role(creator, group_id))?;
    assert_eq!(role, MembershipRole::Admin);
    Ok(())
}

#[rstest]
fn postgres_failed_admin_insert_rolls_back_group(
    context: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let group = NewGroup::new("Ghosts", "club")?;

    let result = ctx.rt.block_on(ctx.store.create_with_admin(
        &group,
        UserId::from_i32(404),
        Utc::now(),
        WriteDeadline::starting_now(Duration::from_secs(10)),
    ));

    match result {
        Err(GroupStoreError::CreationFailed { step, .. }) => {
            assert_eq!(step, CreationStep::InsertAdminMembership);
        }
        other => panic!("expected creation failure, got {other:?}"),
    }
    assert!(ctx.rt.block_on(ctx.store.list_all())?.is_empty());
    Ok(())
}

#[rstest]
fn postgres_groups_list_in_id_order(
    context: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let first = ctx.rt.block_on(ctx.store.insert(&NewGroup::new("Ops", "dept")?))?;
    let second = ctx
        .rt
        .block_on(ctx.store.insert(&NewGroup::new("Sales", "dept")?))?;

    let ids: Vec<GroupId> = ctx
        .rt
        .block_on(ctx.store.list_all())?
        .iter()
        .map(|group| group.id())
        .collect();

    assert!(second > first);
    assert_eq!(ids, vec![first, second]);
    Ok(())
}

#[rstest]
fn postgres_delete_cascades_memberships(
    context: Result<StoreContext, BoxError>,
) -> Result<(), BoxError> {
    let ctx = context?;
    let group_id = ctx.rt.block_on(
        ctx.service
            .create_group_with_admin(engineering(), UserId::from_i32(1)),
    )?;
    ctx.rt
        .block_on(ctx.service.add_member(group_id, UserId::from_i32(2)))?;

    ctx.rt.block_on(ctx.service.delete_group(group_id))?;

    assert!(ctx.rt.block_on(ctx.store.find_by_id(group_id))?.is_none());
    assert!(ctx.rt.block_on(ctx.store.list_members(group_id))?.is_empty());
    let missing = ctx.rt.block_on(ctx.service.delete_group(group_id));
    assert!(matches!(
        missing,
        Err(GroupServiceError::Store(GroupStoreError::GroupNotFound(_)))
    ));
    Ok(())
}
