//! Next-gen upgrade operations.

use super::Registry;
use crate::issue::domain::PullRequestNumber;
use crate::registry::{
    domain::{NewUpgrade, UpgradeDraft, UpgradeRecord},
    ports::{RecordLookup, RegistryError, RegistryResult, RegistryStore},
};
use mockable::Clock;
use tracing::{debug, info};

impl<S, C> Registry<UpgradeRecord, S, C>
where
    S: RegistryStore<UpgradeRecord>,
    C: Clock + Send + Sync,
{
    /// Publishes an upgrade under a freshly allocated revision.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Contention`] when allocation kept colliding
    /// with concurrent inserts, or store failures.
    pub async fn insert(&self, request: NewUpgrade) -> RegistryResult<UpgradeRecord> {
        let release_date = self.clock.utc();
        let record = self
            .allocator
            .allocate::<UpgradeRecord, _, _>(self.store.as_ref(), move |revision| {
                UpgradeDraft::new(request.clone(), release_date, revision)
            })
            .await?;

        info!(
            revision = %record.revision(),
            pull_request = %record.pull_request_number(),
            issue = %record.issue_number(),
            "published upgrade"
        );
        Ok(record)
    }

    /// Marks the latest upgrade for `pull_request` as released now.
    ///
    /// Older duplicates for the same pull request are left untouched, and an
    /// upgrade that is already released is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no upgrade matches.
    pub async fn mark_released(
        &self,
        pull_request: PullRequestNumber,
    ) -> RegistryResult<UpgradeRecord> {
        let released_at = self.clock.utc();
        self.store
            .transaction(move |tx| {
                let mut record = tx
                    .find_latest_by_pull_request(pull_request)?
                    .ok_or(RegistryError::NotFound(RecordLookup::PullRequest(
                        pull_request,
                    )))?;

                if !record.mark_released(released_at) {
                    debug!(revision = %record.revision(), "upgrade already released");
                    return Ok(record);
                }

                tx.update(&record)?;
                info!(
                    revision = %record.revision(),
                    pull_request = %pull_request,
                    "marked upgrade released"
                );
                Ok(record)
            })
            .await
    }
}
