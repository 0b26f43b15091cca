//! Revision allocation for registries that number records at insert.

use crate::registry::{
    domain::{AtInsert, RegistryRecord, Revision, RevisionPolicy},
    ports::{RegistryError, RegistryResult, RegistryStore, RegistryTransaction},
};
use tracing::{debug, warn};

/// Allocates `max + 1` revisions inside a single store transaction.
///
/// Concurrent allocations that collide are retried up to a bounded number
/// of attempts before the conflict is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionAllocator {
    max_attempts: u32,
}

impl Default for RevisionAllocator {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl RevisionAllocator {
    /// Allocator with the default retry budget of eight attempts.
    pub const DEFAULT: Self = Self { max_attempts: 8 };

    /// Creates an allocator that makes at most `max_attempts` attempts.
    ///
    /// A budget of `0` is treated as a single attempt.
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
        }
    }

    /// Returns the attempt budget.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the revision the next allocation would receive.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RevisionOverflow`] when no revision remains,
    /// or store failures.
    pub async fn next_revision<R, S>(store: &S) -> RegistryResult<Revision>
    where
        R: RegistryRecord,
        S: RegistryStore<R>,
    {
        store.transaction(next_after).await
    }

    /// Returns the highest revision in use, or [`Revision::ZERO`] when the
    /// registry holds none.
    ///
    /// # Errors
    ///
    /// Returns store failures.
    pub async fn latest_revision<R, S>(store: &S) -> RegistryResult<Revision>
    where
        R: RegistryRecord,
        S: RegistryStore<R>,
    {
        store
            .transaction(|tx| Ok(tx.max_revision()?.unwrap_or(Revision::ZERO)))
            .await
    }

    /// Reads the current maximum and inserts the draft built for the next
    /// revision, as one unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Contention`] when every attempt collided
    /// with a concurrent allocation, or other store failures.
    pub async fn allocate<R, S, F>(&self, store: &S, make_draft: F) -> RegistryResult<R>
    where
        R: RegistryRecord<Policy = AtInsert>,
        S: RegistryStore<R>,
        F: Fn(Revision) -> R::Draft + Clone + Send + Sync + 'static,
    {
        let mut attempt = 1;
        loop {
            let build_draft = make_draft.clone();
            let result = store
                .transaction(move |tx| {
                    let revision = next_after(tx)?;
                    tx.insert(build_draft(revision))
                })
                .await;

            match result {
                Ok(record) => {
                    debug!(
                        policy = AtInsert::NAME,
                        revision = ?record.revision(),
                        attempt,
                        "allocated revision"
                    );
                    return Ok(record);
                }
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(attempt, error = %err, "revision allocation collided, retrying");
                    attempt += 1;
                }
                Err(err) if err.is_retryable() => {
                    warn!(attempt, error = %err, "revision allocation gave up");
                    return Err(RegistryError::Contention);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn next_after<R: RegistryRecord>(
    tx: &mut dyn RegistryTransaction<R>,
) -> RegistryResult<Revision> {
    tx.max_revision()?
        .unwrap_or(Revision::ZERO)
        .next()
        .ok_or(RegistryError::RevisionOverflow)
}
