//! Legacy build operations.

use super::Registry;
use crate::registry::{
    domain::{BuildDraft, BuildOutcome, BuildRecord, NewBuild, RecordId},
    ports::{RecordLookup, RegistryError, RegistryResult, RegistryStore},
};
use mockable::Clock;
use tracing::info;

impl<S, C> Registry<BuildRecord, S, C>
where
    S: RegistryStore<BuildRecord>,
    C: Clock + Send + Sync,
{
    /// Registers a build at CI start. The build has no revision until one
    /// is assigned.
    ///
    /// # Errors
    ///
    /// Returns store failures.
    pub async fn insert(&self, request: NewBuild) -> RegistryResult<BuildRecord> {
        let draft = BuildDraft::new(request, self.clock.utc());
        let record = self.store.transaction(move |tx| tx.insert(draft)).await?;

        info!(
            id = %record.id(),
            jenkins_id = record.jenkins_id(),
            "registered build"
        );
        Ok(record)
    }

    /// Records pass or fail for a running build.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown build, or
    /// [`RegistryError::State`] when the build already finished.
    pub async fn record_result(
        &self,
        id: RecordId,
        passed: bool,
    ) -> RegistryResult<BuildRecord> {
        let finished_at = self.clock.utc();
        let record = self
            .store
            .transaction(move |tx| {
                let mut record = tx
                    .find_by_id(id)?
                    .ok_or(RegistryError::NotFound(RecordLookup::Id(id)))?;
                record.record_result(passed, finished_at)?;
                tx.update(&record)?;
                Ok(record)
            })
            .await?;

        info!(id = %id, outcome = ?record.outcome(), "recorded build result");
        Ok(record)
    }

    /// Records the number of regression diffs for a build.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown build.
    pub async fn set_num_diffs(
        &self,
        id: RecordId,
        num_diffs: u32,
    ) -> RegistryResult<BuildRecord> {
        self.store
            .transaction(move |tx| {
                let mut record = tx
                    .find_by_id(id)?
                    .ok_or(RegistryError::NotFound(RecordLookup::Id(id)))?;
                record.set_num_diffs(num_diffs);
                tx.update(&record)?;
                Ok(record)
            })
            .await
    }

    /// Lists passed builds that carry a revision, highest revision first.
    ///
    /// A `limit` of `0` means no limit.
    ///
    /// # Errors
    ///
    /// Returns store failures.
    pub async fn released_builds(&self, limit: usize) -> RegistryResult<Vec<BuildRecord>> {
        self.store
            .transaction(move |tx| {
                let mut records: Vec<BuildRecord> = tx
                    .list_by_revision()?
                    .into_iter()
                    .filter(|record| record.outcome() == BuildOutcome::Passed)
                    .collect();
                if limit > 0 {
                    records.truncate(limit);
                }
                Ok(records)
            })
            .await
    }
}
