//! When steps for group membership BDD scenarios.

use super::world::{GroupWorld, run_async};
use roster::group::{domain::UserId, services::CreateGroupRequest};
use rstest_bdd_macros::when;

#[when(r#"user {id:i32} creates the group "{name}" of type "{kind}""#)]
fn user_creates_group(world: &mut GroupWorld, id: i32, name: String, kind: String) {
    let request = CreateGroupRequest::new(name, kind);
    let result = run_async(
        world
            .service
            .create_group_with_admin(request, UserId::from_i32(id)),
    );
    if let Ok(group_id) = &result {
        world.group_id = Some(*group_id);
    }
    world.last_create_result = Some(result);
}

#[when(r#"the role of user {id:i32} is changed to "{role}""#)]
fn role_is_changed(world: &mut GroupWorld, id: i32, role: String) -> Result<(), eyre::Report> {
    let group_id = world.group()?;
    world.last_update_result = Some(run_async(world.service.update_member_role(
        group_id,
        UserId::from_i32(id),
        &role,
    )));
    Ok(())
}

#[when("user {id:i32} is removed from the group")]
fn user_is_removed(world: &mut GroupWorld, id: i32) -> Result<(), eyre::Report> {
    let group_id = world.group()?;
    world.last_remove_result = Some(run_async(
        world.service.remove_member(group_id, UserId::from_i32(id)),
    ));
    Ok(())
}
