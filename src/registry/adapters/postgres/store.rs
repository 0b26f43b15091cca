//! `PostgreSQL` registry store.
//!
//! Each unit of work runs in a `SERIALIZABLE` transaction on a pooled
//! connection inside `spawn_blocking`. Serialisation failures and revision
//! unique-index violations surface as [`RegistryError::Contention`].

use super::{
    models::{
        BuildChangeset, BuildRow, NewBuildRow, NewUpgradeRow, UpgradeChangeset, UpgradeRow,
    },
    schema::{apsimx_upgrades, oldapsim_builds},
};
use crate::issue::domain::{IssueNumber, PullRequestNumber};
use crate::registry::{
    domain::{
        BuildDraft, BuildOutcome, BuildRecord, ListQuery, PersistedBuildData,
        PersistedUpgradeData, RecordId, RegistryRecord, Revision, UpgradeDraft, UpgradeRecord,
    },
    ports::{RecordLookup, RegistryError, RegistryResult, RegistryStore, RegistryTransaction},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use std::marker::PhantomData;

/// `PostgreSQL` connection pool type used by registry adapters.
pub type RegistryPgPool = Pool<ConnectionManager<PgConnection>>;

const REVISION_INDEXES: &[&str] = &[
    "idx_apsimx_upgrades_revision_unique",
    "idx_oldapsim_builds_revision_unique",
];

/// A record type with a `PostgreSQL` table.
pub trait PgRecord: RegistryRecord {
    /// Runs `work` against this record's table over `connection`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `work`.
    fn with_transaction<T>(
        connection: &mut PgConnection,
        work: impl FnOnce(&mut dyn RegistryTransaction<Self>) -> RegistryResult<T>,
    ) -> RegistryResult<T>;
}

/// `PostgreSQL`-backed registry store.
#[derive(Debug, Clone)]
pub struct PostgresRegistryStore<R> {
    pool: RegistryPgPool,
    record: PhantomData<fn() -> R>,
}

impl<R: PgRecord> PostgresRegistryStore<R> {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: RegistryPgPool) -> Self {
        Self {
            pool,
            record: PhantomData,
        }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RegistryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RegistryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RegistryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RegistryError::persistence)?
    }
}

#[async_trait]
impl<R: PgRecord> RegistryStore<R> for PostgresRegistryStore<R> {
    async fn transaction<T, F>(&self, work: F) -> RegistryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn RegistryTransaction<R>) -> RegistryResult<T> + Send + 'static,
    {
        self.run_blocking(move |connection| {
            connection
                .build_transaction()
                .serializable()
                .run(|connection| R::with_transaction(connection, work))
        })
        .await
    }
}

impl From<DieselError> for RegistryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
                Self::Contention
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                if is_revision_unique_violation(info.as_ref()) =>
            {
                Self::Contention
            }
            _ => Self::persistence(err),
        }
    }
}

fn is_revision_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| REVISION_INDEXES.contains(&name))
}

fn to_u32(value: i64) -> RegistryResult<u32> {
    u32::try_from(value).map_err(RegistryError::persistence)
}

fn to_optional_u32(value: Option<i64>) -> RegistryResult<Option<u32>> {
    value.map(to_u32).transpose()
}

fn limit_to_i64(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl PgRecord for UpgradeRecord {
    fn with_transaction<T>(
        connection: &mut PgConnection,
        work: impl FnOnce(&mut dyn RegistryTransaction<Self>) -> RegistryResult<T>,
    ) -> RegistryResult<T> {
        work(&mut UpgradeTransaction { connection })
    }
}

struct UpgradeTransaction<'c> {
    connection: &'c mut PgConnection,
}

fn row_to_upgrade(row: UpgradeRow) -> RegistryResult<UpgradeRecord> {
    Ok(UpgradeRecord::from_persisted(PersistedUpgradeData {
        id: RecordId::new(row.id),
        issue_number: IssueNumber::new(to_u32(row.issue_number)?),
        pull_request_number: PullRequestNumber::new(to_u32(row.pull_request_number)?),
        issue_title: row.issue_title,
        issue_url: row.issue_url,
        release_date: row.release_date,
        revision: Revision::new(to_u32(row.revision)?),
        released: row.released,
    }))
}

fn to_new_upgrade_row(draft: &UpgradeDraft) -> NewUpgradeRow {
    let request = draft.request();
    NewUpgradeRow {
        issue_number: i64::from(request.issue_number().value()),
        pull_request_number: i64::from(request.pull_request_number().value()),
        issue_title: request.issue_title().to_owned(),
        issue_url: request.issue_url().to_owned(),
        release_date: draft.release_date(),
        revision: i64::from(draft.revision().value()),
        released: false,
    }
}

impl RegistryTransaction<UpgradeRecord> for UpgradeTransaction<'_> {
    fn insert(&mut self, draft: UpgradeDraft) -> RegistryResult<UpgradeRecord> {
        let row = diesel::insert_into(apsimx_upgrades::table)
            .values(&to_new_upgrade_row(&draft))
            .returning(UpgradeRow::as_returning())
            .get_result(self.connection)?;
        row_to_upgrade(row)
    }

    fn update(&mut self, record: &UpgradeRecord) -> RegistryResult<()> {
        let changes = UpgradeChangeset {
            release_date: record.release_date(),
            revision: i64::from(record.revision().value()),
            released: record.is_released(),
        };
        let updated = diesel::update(apsimx_upgrades::table.find(record.id().into_inner()))
            .set(&changes)
            .execute(self.connection)?;
        if updated == 0 {
            return Err(RegistryError::NotFound(RecordLookup::Id(record.id())));
        }
        Ok(())
    }

    fn find_by_id(&mut self, id: RecordId) -> RegistryResult<Option<UpgradeRecord>> {
        apsimx_upgrades::table
            .find(id.into_inner())
            .select(UpgradeRow::as_select())
            .first(self.connection)
            .optional()?
            .map(row_to_upgrade)
            .transpose()
    }

    fn find_by_revision(&mut self, revision: Revision) -> RegistryResult<Option<UpgradeRecord>> {
        apsimx_upgrades::table
            .filter(apsimx_upgrades::revision.eq(i64::from(revision.value())))
            .select(UpgradeRow::as_select())
            .first(self.connection)
            .optional()?
            .map(row_to_upgrade)
            .transpose()
    }

    fn find_latest_by_pull_request(
        &mut self,
        pull_request: PullRequestNumber,
    ) -> RegistryResult<Option<UpgradeRecord>> {
        apsimx_upgrades::table
            .filter(apsimx_upgrades::pull_request_number.eq(i64::from(pull_request.value())))
            .order(apsimx_upgrades::id.desc())
            .select(UpgradeRow::as_select())
            .first(self.connection)
            .optional()?
            .map(row_to_upgrade)
            .transpose()
    }

    fn max_revision(&mut self) -> RegistryResult<Option<Revision>> {
        let max = apsimx_upgrades::table
            .select(diesel::dsl::max(apsimx_upgrades::revision))
            .first::<Option<i64>>(self.connection)?;
        Ok(to_optional_u32(max)?.map(Revision::new))
    }

    fn list(&mut self, query: &ListQuery) -> RegistryResult<Vec<UpgradeRecord>> {
        let mut statement = apsimx_upgrades::table
            .select(UpgradeRow::as_select())
            .order((
                apsimx_upgrades::release_date.desc(),
                apsimx_upgrades::revision.desc(),
                apsimx_upgrades::id.desc(),
            ))
            .into_boxed();
        if let Some(min) = query.min_revision() {
            statement = statement.filter(apsimx_upgrades::revision.gt(i64::from(min.value())));
        }
        if let Some(limit) = query.limit() {
            statement = statement.limit(limit_to_i64(limit));
        }
        statement
            .load::<UpgradeRow>(self.connection)?
            .into_iter()
            .map(row_to_upgrade)
            .collect()
    }

    fn list_by_revision(&mut self) -> RegistryResult<Vec<UpgradeRecord>> {
        apsimx_upgrades::table
            .select(UpgradeRow::as_select())
            .order(apsimx_upgrades::revision.desc())
            .load::<UpgradeRow>(self.connection)?
            .into_iter()
            .map(row_to_upgrade)
            .collect()
    }
}

impl PgRecord for BuildRecord {
    fn with_transaction<T>(
        connection: &mut PgConnection,
        work: impl FnOnce(&mut dyn RegistryTransaction<Self>) -> RegistryResult<T>,
    ) -> RegistryResult<T> {
        work(&mut BuildTransaction { connection })
    }
}

struct BuildTransaction<'c> {
    connection: &'c mut PgConnection,
}

fn row_to_build(row: BuildRow) -> RegistryResult<BuildRecord> {
    Ok(BuildRecord::from_persisted(PersistedBuildData {
        id: RecordId::new(row.id),
        author: row.author,
        title: row.title,
        bug_id: IssueNumber::new(to_u32(row.bug_id)?),
        outcome: BuildOutcome::from_pass(row.pass),
        start_time: row.start_time,
        finish_time: row.finish_time,
        num_diffs: to_optional_u32(row.num_diffs)?,
        revision: to_optional_u32(row.revision_number)?.map(Revision::new),
        jenkins_id: to_u32(row.jenkins_id)?,
        pull_request_id: to_optional_u32(row.pull_request_id)?.map(PullRequestNumber::new),
    }))
}

fn to_new_build_row(draft: &BuildDraft) -> NewBuildRow {
    let request = draft.request();
    NewBuildRow {
        author: request.author.clone(),
        title: request.title.clone(),
        bug_id: i64::from(request.bug_id.value()),
        start_time: draft.start_time(),
        jenkins_id: i64::from(request.jenkins_id),
        pull_request_id: request
            .pull_request_id
            .map(|number| i64::from(number.value())),
    }
}

impl RegistryTransaction<BuildRecord> for BuildTransaction<'_> {
    fn insert(&mut self, draft: BuildDraft) -> RegistryResult<BuildRecord> {
        let row = diesel::insert_into(oldapsim_builds::table)
            .values(&to_new_build_row(&draft))
            .returning(BuildRow::as_returning())
            .get_result(self.connection)?;
        row_to_build(row)
    }

    fn update(&mut self, record: &BuildRecord) -> RegistryResult<()> {
        let changes = BuildChangeset {
            pass: record.outcome().as_pass(),
            finish_time: record.finish_time(),
            num_diffs: record.num_diffs().map(i64::from),
            revision_number: record.revision().map(|revision| i64::from(revision.value())),
        };
        let updated = diesel::update(oldapsim_builds::table.find(record.id().into_inner()))
            .set(&changes)
            .execute(self.connection)?;
        if updated == 0 {
            return Err(RegistryError::NotFound(RecordLookup::Id(record.id())));
        }
        Ok(())
    }

    fn find_by_id(&mut self, id: RecordId) -> RegistryResult<Option<BuildRecord>> {
        oldapsim_builds::table
            .find(id.into_inner())
            .select(BuildRow::as_select())
            .first(self.connection)
            .optional()?
            .map(row_to_build)
            .transpose()
    }

    fn find_by_revision(&mut self, revision: Revision) -> RegistryResult<Option<BuildRecord>> {
        oldapsim_builds::table
            .filter(oldapsim_builds::revision_number.eq(i64::from(revision.value())))
            .select(BuildRow::as_select())
            .first(self.connection)
            .optional()?
            .map(row_to_build)
            .transpose()
    }

    fn find_latest_by_pull_request(
        &mut self,
        pull_request: PullRequestNumber,
    ) -> RegistryResult<Option<BuildRecord>> {
        oldapsim_builds::table
            .filter(oldapsim_builds::pull_request_id.eq(i64::from(pull_request.value())))
            .order(oldapsim_builds::id.desc())
            .select(BuildRow::as_select())
            .first(self.connection)
            .optional()?
            .map(row_to_build)
            .transpose()
    }

    fn max_revision(&mut self) -> RegistryResult<Option<Revision>> {
        let max = oldapsim_builds::table
            .select(diesel::dsl::max(oldapsim_builds::revision_number))
            .first::<Option<i64>>(self.connection)?;
        Ok(to_optional_u32(max)?.map(Revision::new))
    }

    fn list(&mut self, query: &ListQuery) -> RegistryResult<Vec<BuildRecord>> {
        let mut statement = oldapsim_builds::table
            .select(BuildRow::as_select())
            .order((
                oldapsim_builds::start_time.desc(),
                oldapsim_builds::revision_number.desc().nulls_last(),
                oldapsim_builds::id.desc(),
            ))
            .into_boxed();
        if let Some(min) = query.min_revision() {
            statement =
                statement.filter(oldapsim_builds::revision_number.gt(i64::from(min.value())));
        }
        if let Some(limit) = query.limit() {
            statement = statement.limit(limit_to_i64(limit));
        }
        statement
            .load::<BuildRow>(self.connection)?
            .into_iter()
            .map(row_to_build)
            .collect()
    }

    fn list_by_revision(&mut self) -> RegistryResult<Vec<BuildRecord>> {
        oldapsim_builds::table
            .filter(oldapsim_builds::revision_number.is_not_null())
            .select(BuildRow::as_select())
            .order(oldapsim_builds::revision_number.desc())
            .load::<BuildRow>(self.connection)?
            .into_iter()
            .map(row_to_build)
            .collect()
    }
}
