//! In-memory integration tests for membership management.

use super::helpers::{TestService, create_engineering, service};
use roster::group::{
    domain::{GroupId, MembershipRole, UserId},
    ports::GroupStoreError,
    services::GroupServiceError,
};
use rstest::rstest;

const ALICE: UserId = UserId::from_i32(1);
const BOB: UserId = UserId::from_i32(2);
const CAROL: UserId = UserId::from_i32(3);

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn members_are_listed_in_user_order(service: TestService) {
    let group_id = create_engineering(&service, BOB).await;
    service.add_member(group_id, CAROL).await.expect("add carol");
    service.add_member(group_id, ALICE).await.expect("add alice");

    let ids: Vec<UserId> = service
        .list_members(group_id)
        .await
        .expect("listing should succeed")
        .iter()
        .map(|profile| profile.id)
        .collect();

    assert_eq!(ids, vec![ALICE, BOB, CAROL]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_add_is_rejected_as_duplicate(service: TestService) {
    let group_id = create_engineering(&service, ALICE).await;
    service.add_member(group_id, BOB).await.expect("first add");

    let result = service.add_member_with_role(group_id, BOB, "admin").await;

    assert!(matches!(
        result,
        Err(GroupServiceError::Store(GroupStoreError::DuplicateMembership { .. }))
    ));
    let role = service.member_role(BOB, group_id).await.expect("role lookup");
    assert_eq!(role, MembershipRole::Member);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn adding_to_unknown_group_fails(service: TestService) {
    let result = service.add_member(GroupId::from_i32(77), BOB).await;

    assert!(matches!(
        result,
        Err(GroupServiceError::Store(GroupStoreError::Persistence(_)))
    ));
}

#[rstest]
#[case("admin", MembershipRole::Admin)]
#[case("Member", MembershipRole::Member)]
#[case(" administrator ", MembershipRole::Admin)]
#[tokio::test(flavor = "multi_thread")]
async fn explicit_roles_are_normalized(
    service: TestService,
    #[case] raw: &str,
    #[case] expected: MembershipRole,
) {
    let group_id = create_engineering(&service, ALICE).await;

    service
        .add_member_with_role(group_id, BOB, raw)
        .await
        .expect("add should succeed");

    let role = service.member_role(BOB, group_id).await.expect("role lookup");
    assert_eq!(role, expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn demoted_admin_becomes_member(service: TestService) {
    let group_id = create_engineering(&service, ALICE).await;

    service
        .update_member_role(group_id, ALICE, "member")
        .await
        .expect("demotion should succeed");

    let role = service.member_role(ALICE, group_id).await.expect("role lookup");
    assert_eq!(role, MembershipRole::Member);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removed_member_has_no_role(service: TestService) {
    let group_id = create_engineering(&service, ALICE).await;
    service.add_member(group_id, BOB).await.expect("add bob");

    service
        .remove_member(group_id, BOB)
        .await
        .expect("removal should succeed");

    let err = service
        .member_role(BOB, group_id)
        .await
        .expect_err("role lookup should fail");
    assert!(matches!(
        err,
        GroupServiceError::Store(GroupStoreError::MembershipNotFound { .. })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn external_id_resolves_to_member_role(service: TestService) {
    let group_id = create_engineering(&service, ALICE).await;
    service.add_member(group_id, CAROL).await.expect("add carol");

    let admin = service
        .role_for_external_user("u1", group_id)
        .await
        .expect("alice lookup");
    let member = service
        .role_for_external_user("u3", group_id)
        .await
        .expect("carol lookup");
    let outsider = service
        .role_for_external_user("u4", group_id)
        .await
        .expect_err("dave is not a member");

    assert_eq!(admin, MembershipRole::Admin);
    assert_eq!(member, MembershipRole::Member);
    assert!(outsider.is_not_found());
}
