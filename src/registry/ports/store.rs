//! Store port for registry records.

use crate::issue::domain::PullRequestNumber;
use crate::registry::domain::{
    ListQuery, RecordId, RecordStateError, RegistryRecord, Revision,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for registry store operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Record access available inside one store transaction.
///
/// Implementations are synchronous; the surrounding [`RegistryStore`]
/// decides where the work runs.
pub trait RegistryTransaction<R: RegistryRecord> {
    /// Inserts a new record and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RevisionTaken`] or
    /// [`RegistryError::Contention`] when the draft's revision is already
    /// held.
    fn insert(&mut self, draft: R::Draft) -> RegistryResult<R>;

    /// Persists changes to an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the record does not exist.
    fn update(&mut self, record: &R) -> RegistryResult<()>;

    /// Finds a record by identifier.
    fn find_by_id(&mut self, id: RecordId) -> RegistryResult<Option<R>>;

    /// Finds the record holding `revision`.
    fn find_by_revision(&mut self, revision: Revision) -> RegistryResult<Option<R>>;

    /// Finds the most recently inserted record for a pull request.
    fn find_latest_by_pull_request(
        &mut self,
        pull_request: PullRequestNumber,
    ) -> RegistryResult<Option<R>>;

    /// Returns the highest revision held by any record.
    fn max_revision(&mut self) -> RegistryResult<Option<Revision>>;

    /// Lists records according to `query`.
    fn list(&mut self, query: &ListQuery) -> RegistryResult<Vec<R>>;

    /// Lists every record carrying a revision, highest revision first.
    fn list_by_revision(&mut self) -> RegistryResult<Vec<R>>;
}

/// Transactional registry persistence.
#[async_trait]
pub trait RegistryStore<R: RegistryRecord>: Send + Sync {
    /// Runs `work` as one unit of work.
    ///
    /// Changes made by `work` are committed only when it returns `Ok`.
    ///
    /// # Errors
    ///
    /// Propagates errors from `work`; returns
    /// [`RegistryError::Contention`] when a concurrent transaction forced a
    /// rollback, or [`RegistryError::Persistence`] for infrastructure
    /// failures.
    async fn transaction<T, F>(&self, work: F) -> RegistryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn RegistryTransaction<R>) -> RegistryResult<T> + Send + 'static;
}

/// Key used for a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLookup {
    /// Lookup by store identifier.
    Id(RecordId),
    /// Lookup by revision.
    Revision(Revision),
    /// Lookup by pull request.
    PullRequest(PullRequestNumber),
}

impl fmt::Display for RecordLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Revision(revision) => write!(f, "revision {revision}"),
            Self::PullRequest(pull_request) => write!(f, "pull request #{pull_request}"),
        }
    }
}

/// Errors returned by registry stores and services.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// No record matched the lookup.
    #[error("no record for {0}")]
    NotFound(RecordLookup),

    /// The revision is held by another record.
    #[error("revision {revision} is already held by record {holder}")]
    RevisionTaken {
        /// Contested revision.
        revision: Revision,
        /// Record currently holding it.
        holder: RecordId,
    },

    /// Revision 0 never names a record and cannot be assigned.
    #[error("revision 0 cannot be assigned")]
    ZeroRevision,

    /// The record's state rejected the mutation.
    #[error(transparent)]
    State(#[from] RecordStateError),

    /// A concurrent transaction won; the operation may be retried.
    #[error("concurrent update conflict")]
    Contention,

    /// No revision remains above the current maximum.
    #[error("revision space exhausted")]
    RevisionOverflow,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RegistryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` for failures a fresh attempt may avoid.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention | Self::RevisionTaken { .. })
    }
}
