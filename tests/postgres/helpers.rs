//! Shared test helpers for `PostgreSQL` integration tests.

pub use super::cluster::{BoxError, PostgresCluster, postgres_cluster};
use apsim_builds::registry::adapters::postgres::{PgRecord, PostgresRegistryStore};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::runtime::Runtime;

/// SQL creating the next-gen upgrades table.
pub const CREATE_UPGRADES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_apsimx_upgrades/up.sql");

/// SQL creating the legacy builds table.
pub const CREATE_BUILDS_SQL: &str =
    include_str!("../../migrations/2026-10-01-000001_create_oldapsim_builds/up.sql");

static DATABASE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Creates a multi-threaded runtime so blocking store work runs in parallel.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn test_runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
}

/// Drops a test database when it goes out of scope.
pub struct CleanupGuard {
    cluster: PostgresCluster,
    db_name: String,
}

impl CleanupGuard {
    #[must_use]
    pub const fn new(cluster: PostgresCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(&self.db_name));
    }
}

/// Creates a migrated database and a store over it.
///
/// Declare the guard before the store so the pool closes first.
///
/// # Errors
///
/// Returns an error if database creation, migration or pool setup fails.
pub fn setup_store<R: PgRecord>(
    cluster: PostgresCluster,
    prefix: &str,
) -> Result<(CleanupGuard, Arc<PostgresRegistryStore<R>>), BoxError> {
    let db_name = format!(
        "{prefix}_{}_{}",
        std::process::id(),
        DATABASE_COUNTER.fetch_add(1, Ordering::SeqCst)
    );
    cluster.create_database(&db_name)?;
    let guard = CleanupGuard::new(cluster, db_name.clone());

    let url = cluster.database_url(&db_name);
    let mut conn = PgConnection::establish(&url).map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(CREATE_UPGRADES_SQL)
        .map_err(|err| Box::new(err) as BoxError)?;
    conn.batch_execute(CREATE_BUILDS_SQL)
        .map_err(|err| Box::new(err) as BoxError)?;

    let pool = Pool::builder()
        .max_size(8)
        .build(ConnectionManager::<PgConnection>::new(url))
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok((guard, Arc::new(PostgresRegistryStore::new(pool))))
}
