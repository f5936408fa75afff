//! Shared test helpers for `PostgreSQL` integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use roster::{
    config::{OperationTimeouts, StoreConfig},
    group::{adapters::postgres::PostgresGroupStore, services::GroupMembershipService},
};
use rstest::fixture;
use tokio::runtime::Runtime;

/// Boxed error type used by fallible helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service type exercised by the `PostgreSQL` suites.
pub type TestService = GroupMembershipService<PostgresGroupStore, DefaultClock>;

/// SQL creating the group tables.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-16-000000_create_groups/up.sql");

/// Template database name for the pre-migrated, pre-seeded schema.
pub const TEMPLATE_DB: &str = "roster_test_template";

/// Number of directory users seeded into the template.
pub const SEEDED_USERS: i32 = 3;

static DATABASE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Creates a tokio runtime for driving the async store in sync tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Box::new(e) as BoxError)
}

/// Ensures the template database exists with the schema applied and users
/// `u1` to `u{SEEDED_USERS}` seeded with keys 1 to [`SEEDED_USERS`].
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("schema: {e}"))?;
            conn.batch_execute(&seed_users_sql())
                .map_err(|e| eyre::eyre!("seed users: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

fn seed_users_sql() -> String {
    let rows: Vec<String> = (1..=SEEDED_USERS)
        .map(|id| format!("('u{id}', 'user{id}', 'u{id}@example.com')"))
        .collect();
    format!(
        "INSERT INTO \"user\" (external_id, username, email) VALUES {};",
        rows.join(", ")
    )
}

/// Drops the per-test database even if the test panics.
pub struct CleanupGuard {
    cluster: &'static TestCluster,
    db_name: String,
}

impl CleanupGuard {
    const fn new(cluster: &'static TestCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            tracing::warn!(db = %self.db_name, error = %e, "failed to drop test database");
        }
    }
}

/// Store and service over one database copied from the template.
///
/// Fields drop in declaration order, so the pool is closed before the
/// database is dropped.
pub struct StoreContext {
    /// Store under test.
    pub store: Arc<PostgresGroupStore>,
    /// Service over the same store.
    pub service: TestService,
    /// Runtime driving store calls.
    pub rt: Runtime,
    /// Connection URL of the test database.
    pub url: String,
    _guard: CleanupGuard,
}

/// Deadlines used when a test does not care about timing.
#[must_use]
pub fn relaxed_timeouts() -> OperationTimeouts {
    OperationTimeouts {
        read: Duration::from_secs(10),
        write: Duration::from_secs(10),
    }
}

/// Copies the template into a fresh database and connects a single
/// connection store with the given deadlines.
///
/// # Errors
///
/// Returns an error if template setup, database creation, or connecting
/// fails.
pub fn setup_store(
    cluster: &'static TestCluster,
    timeouts: OperationTimeouts,
) -> Result<StoreContext, BoxError> {
    ensure_template(cluster)?;
    let db_name = format!(
        "roster_test_{}_{}",
        std::process::id(),
        DATABASE_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    cluster
        .create_database_from_template(db_name.as_str(), TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    let guard = CleanupGuard::new(cluster, db_name.clone());

    let url = cluster.connection().database_url(&db_name);
    let config = StoreConfig::new(url.clone())
        .with_pool_max_size(1)
        .with_timeouts(timeouts);
    let store = Arc::new(PostgresGroupStore::connect(&config)?);
    let service =
        GroupMembershipService::from_config(Arc::clone(&store), Arc::new(DefaultClock), &config);
    Ok(StoreContext {
        store,
        service,
        rt: test_runtime()?,
        url,
        _guard: guard,
    })
}

/// Provides a store context with relaxed deadlines.
#[fixture]
pub fn context(shared_test_cluster: &'static TestCluster) -> Result<StoreContext, BoxError> {
    setup_store(shared_test_cluster, relaxed_timeouts())
}

/// Takes an exclusive lock on `table` from a second connection and releases
/// it after `hold`.
///
/// The lock is held when this returns. Join the handle before asserting on
/// the table.
///
/// # Errors
///
/// Returns an error if the connection or the lock cannot be obtained.
pub fn hold_exclusive_lock(
    url: &str,
    table: &str,
    hold: Duration,
) -> Result<JoinHandle<Result<(), BoxError>>, BoxError> {
    let mut conn = PgConnection::establish(url).map_err(|e| Box::new(e) as BoxError)?;
    conn.batch_execute(&format!("BEGIN; LOCK TABLE {table} IN ACCESS EXCLUSIVE MODE;"))?;
    Ok(std::thread::spawn(move || {
        std::thread::sleep(hold);
        conn.batch_execute("COMMIT;")
            .map_err(|e| Box::new(e) as BoxError)
    }))
}

/// Waits for a lock holder started by [`hold_exclusive_lock`].
///
/// # Errors
///
/// Returns an error if the holder failed or panicked.
pub fn release(holder: JoinHandle<Result<(), BoxError>>) -> Result<(), BoxError> {
    holder
        .join()
        .map_err(|_| Box::<dyn std::error::Error + Send + Sync>::from("lock holder panicked"))?
}
