//! Registry service shared by the next-gen and legacy registries.

use super::RevisionAllocator;
use crate::issue::domain::PullRequestNumber;
use crate::registry::{
    domain::{
        AssignableRevision, BuildRecord, ListQuery, RecordId, RegistryRecord, Revision,
        RevisionPolicy, UpgradeRecord,
    },
    ports::{RecordLookup, RegistryError, RegistryResult, RegistryStore},
};
use mockable::Clock;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::info;

/// Lookups, listing and revision queries over one registry.
///
/// Record-specific operations live in separate `impl` blocks for
/// [`UpgradeRecord`] and [`BuildRecord`].
pub struct Registry<R, S, C>
where
    R: RegistryRecord,
    S: RegistryStore<R>,
    C: Clock + Send + Sync,
{
    pub(super) store: Arc<S>,
    pub(super) clock: Arc<C>,
    pub(super) allocator: RevisionAllocator,
    record: PhantomData<fn() -> R>,
}

/// Registry of next-gen upgrades.
pub type UpgradeRegistry<S, C> = Registry<UpgradeRecord, S, C>;

/// Registry of legacy builds.
pub type BuildRegistry<S, C> = Registry<BuildRecord, S, C>;

impl<R, S, C> Clone for Registry<R, S, C>
where
    R: RegistryRecord,
    S: RegistryStore<R>,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            allocator: self.allocator,
            record: PhantomData,
        }
    }
}

impl<R, S, C> Registry<R, S, C>
where
    R: RegistryRecord,
    S: RegistryStore<R>,
    C: Clock + Send + Sync,
{
    /// Creates a registry over `store` using `clock` for timestamps.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            allocator: RevisionAllocator::DEFAULT,
            record: PhantomData,
        }
    }

    /// Replaces the revision allocator.
    #[must_use]
    pub const fn with_allocator(mut self, allocator: RevisionAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Lists records most recent first, filtered and truncated by `query`.
    ///
    /// # Errors
    ///
    /// Returns store failures.
    pub async fn list(&self, query: ListQuery) -> RegistryResult<Vec<R>> {
        self.store.transaction(move |tx| tx.list(&query)).await
    }

    /// Finds a record by store identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no record has `id`.
    pub async fn find_by_id(&self, id: RecordId) -> RegistryResult<R> {
        self.store
            .transaction(move |tx| {
                tx.find_by_id(id)?
                    .ok_or(RegistryError::NotFound(RecordLookup::Id(id)))
            })
            .await
    }

    /// Finds the record holding `revision`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no record holds `revision`.
    pub async fn find_by_revision(&self, revision: Revision) -> RegistryResult<R> {
        self.store
            .transaction(move |tx| {
                tx.find_by_revision(revision)?
                    .ok_or(RegistryError::NotFound(RecordLookup::Revision(revision)))
            })
            .await
    }

    /// Finds the most recently inserted record for `pull_request`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no record matches.
    pub async fn find_by_pull_request(
        &self,
        pull_request: PullRequestNumber,
    ) -> RegistryResult<R> {
        self.store
            .transaction(move |tx| {
                tx.find_latest_by_pull_request(pull_request)?
                    .ok_or(RegistryError::NotFound(RecordLookup::PullRequest(
                        pull_request,
                    )))
            })
            .await
    }

    /// Returns the highest revision in use, or `0` for an empty registry.
    ///
    /// # Errors
    ///
    /// Returns store failures.
    pub async fn latest_revision(&self) -> RegistryResult<Revision> {
        RevisionAllocator::latest_revision::<R, S>(self.store.as_ref()).await
    }

    /// Returns the revision the next allocation would receive.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RevisionOverflow`] or store failures.
    pub async fn next_revision(&self) -> RegistryResult<Revision> {
        RevisionAllocator::next_revision::<R, S>(self.store.as_ref()).await
    }
}

impl<R, S, C> Registry<R, S, C>
where
    R: AssignableRevision,
    S: RegistryStore<R>,
    C: Clock + Send + Sync,
{
    /// Assigns `revision` to the latest record for `pull_request`.
    ///
    /// Reassigning the revision the record already holds is a no-op. The
    /// ownership check and the write share one unit of work, so a rejected
    /// assignment leaves every record unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ZeroRevision`] for revision 0,
    /// [`RegistryError::NotFound`] when no record matches the pull request, [`RegistryError::RevisionTaken`] when another record holds
    /// `revision`, or [`RegistryError::State`] when the target already
    /// carries a different revision.
    pub async fn set_revision(
        &self,
        pull_request: PullRequestNumber,
        revision: Revision,
    ) -> RegistryResult<R> {
        if revision == Revision::ZERO {
            return Err(RegistryError::ZeroRevision);
        }
        let record = self
            .store
            .transaction(move |tx| {
                let mut target = tx
                    .find_latest_by_pull_request(pull_request)?
                    .ok_or(RegistryError::NotFound(RecordLookup::PullRequest(
                        pull_request,
                    )))?;

                if let Some(holder) = tx.find_by_revision(revision)? {
                    if holder.id() != target.id() {
                        return Err(RegistryError::RevisionTaken {
                            revision,
                            holder: holder.id(),
                        });
                    }
                    return Ok(holder);
                }

                target.assign_revision(revision)?;
                tx.update(&target)?;
                Ok(target)
            })
            .await?;

        info!(
            policy = <R::Policy as RevisionPolicy>::NAME,
            pull_request = %pull_request,
            revision = %revision,
            record = %record.id(),
            "assigned revision"
        );
        Ok(record)
    }
}
