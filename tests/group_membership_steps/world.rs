//! Shared world state for group membership BDD scenarios.

use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use roster::group::{
    adapters::memory::InMemoryGroupStore,
    domain::{GroupId, MemberProfile, UserId},
    services::{GroupMembershipService, GroupServiceError},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestGroupService = GroupMembershipService<InMemoryGroupStore, DefaultClock>;

/// Scenario world for group membership behaviour tests.
pub struct GroupWorld {
    /// Store shared with the service, used to seed the directory.
    pub store: Arc<InMemoryGroupStore>,
    /// The membership service under test.
    pub service: TestGroupService,
    /// Group the scenario operates on.
    pub group_id: Option<GroupId>,
    /// Result of the last creation attempt.
    pub last_create_result: Option<Result<GroupId, GroupServiceError>>,
    /// Result of the last role change.
    pub last_update_result: Option<Result<(), GroupServiceError>>,
    /// Result of the last removal.
    pub last_remove_result: Option<Result<(), GroupServiceError>>,
}

impl GroupWorld {
    /// Creates a world over an empty store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryGroupStore::new());
        let service = GroupMembershipService::new(Arc::clone(&store), Arc::new(DefaultClock));
        Self {
            store,
            service,
            group_id: None,
            last_create_result: None,
            last_update_result: None,
            last_remove_result: None,
        }
    }

    /// Returns the scenario's group.
    ///
    /// # Errors
    ///
    /// Returns an error if no group has been created yet.
    pub fn group(&self) -> Result<GroupId, eyre::Report> {
        self.group_id
            .ok_or_else(|| eyre::eyre!("no group in scenario world"))
    }
}

impl Default for GroupWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> GroupWorld {
    GroupWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Builds a directory profile with external id `u{id}`.
#[must_use]
pub fn directory_profile(id: i32) -> MemberProfile {
    let now = Utc::now();
    MemberProfile {
        id: UserId::from_i32(id),
        external_id: format!("u{id}"),
        username: format!("user{id}"),
        first_name: None,
        last_name: None,
        email: format!("user{id}@example.com"),
        is_active: true,
        created_at: now,
        updated_at: now,
        default_group_id: None,
    }
}
