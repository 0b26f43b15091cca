//! In-memory registry store.
//!
//! One mutex guards the whole registry, so transactions are fully
//! serialised. Each transaction works on a copy of the state that replaces
//! the original only when the work succeeds.

use crate::issue::domain::PullRequestNumber;
use crate::registry::{
    domain::{ListQuery, RecordId, RegistryRecord, Revision},
    ports::{RecordLookup, RegistryError, RegistryResult, RegistryStore, RegistryTransaction},
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct InMemoryRegistryState<R> {
    records: Vec<R>,
    next_id: i64,
}

impl<R> Default for InMemoryRegistryState<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

/// Thread-safe in-memory registry store.
#[derive(Debug)]
pub struct InMemoryRegistryStore<R> {
    state: Arc<Mutex<InMemoryRegistryState<R>>>,
}

impl<R> Clone for InMemoryRegistryStore<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<R> Default for InMemoryRegistryStore<R> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryRegistryState::default())),
        }
    }
}

impl<R: RegistryRecord> InMemoryRegistryStore<R> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Persistence`] when the internal lock is
    /// poisoned.
    pub fn record_count(&self) -> RegistryResult<usize> {
        let state = self.state.lock().map_err(|err| lock_error(&err))?;
        Ok(state.records.len())
    }

    fn run<T, F>(&self, work: F) -> RegistryResult<T>
    where
        F: FnOnce(&mut dyn RegistryTransaction<R>) -> RegistryResult<T>,
    {
        let mut state = self.state.lock().map_err(|err| lock_error(&err))?;
        let mut working = state.clone();
        let output = work(&mut MemoryTransaction {
            state: &mut working,
        })?;
        *state = working;
        Ok(output)
    }
}

#[async_trait]
impl<R: RegistryRecord> RegistryStore<R> for InMemoryRegistryStore<R> {
    async fn transaction<T, F>(&self, work: F) -> RegistryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn RegistryTransaction<R>) -> RegistryResult<T> + Send + 'static,
    {
        self.run(work)
    }
}

struct MemoryTransaction<'a, R> {
    state: &'a mut InMemoryRegistryState<R>,
}

impl<R: RegistryRecord> MemoryTransaction<'_, R> {
    fn ensure_revision_free(&self, record: &R) -> RegistryResult<()> {
        let Some(revision) = record.revision() else {
            return Ok(());
        };
        match self
            .state
            .records
            .iter()
            .find(|other| other.id() != record.id() && other.revision() == Some(revision))
        {
            Some(holder) => Err(RegistryError::RevisionTaken {
                revision,
                holder: holder.id(),
            }),
            None => Ok(()),
        }
    }
}

impl<R: RegistryRecord> RegistryTransaction<R> for MemoryTransaction<'_, R> {
    fn insert(&mut self, draft: R::Draft) -> RegistryResult<R> {
        let id = RecordId::new(self.state.next_id);
        let record = R::from_draft(id, draft);
        self.ensure_revision_free(&record)?;
        self.state.next_id += 1;
        self.state.records.push(record.clone());
        Ok(record)
    }

    fn update(&mut self, record: &R) -> RegistryResult<()> {
        self.ensure_revision_free(record)?;
        let stored = self
            .state
            .records
            .iter_mut()
            .find(|stored| stored.id() == record.id())
            .ok_or_else(|| RegistryError::NotFound(RecordLookup::Id(record.id())))?;
        stored.clone_from(record);
        Ok(())
    }

    fn find_by_id(&mut self, id: RecordId) -> RegistryResult<Option<R>> {
        Ok(self
            .state
            .records
            .iter()
            .find(|record| record.id() == id)
            .cloned())
    }

    fn find_by_revision(&mut self, revision: Revision) -> RegistryResult<Option<R>> {
        Ok(self
            .state
            .records
            .iter()
            .find(|record| record.revision() == Some(revision))
            .cloned())
    }

    fn find_latest_by_pull_request(
        &mut self,
        pull_request: PullRequestNumber,
    ) -> RegistryResult<Option<R>> {
        Ok(self
            .state
            .records
            .iter()
            .filter(|record| record.pull_request() == Some(pull_request))
            .max_by_key(|record| record.id())
            .cloned())
    }

    fn max_revision(&mut self) -> RegistryResult<Option<Revision>> {
        Ok(self
            .state
            .records
            .iter()
            .filter_map(R::revision)
            .max())
    }

    fn list(&mut self, query: &ListQuery) -> RegistryResult<Vec<R>> {
        Ok(query.apply(self.state.records.clone()))
    }

    fn list_by_revision(&mut self) -> RegistryResult<Vec<R>> {
        let mut records: Vec<R> = self
            .state
            .records
            .iter()
            .filter(|record| record.revision().is_some())
            .cloned()
            .collect();
        records.sort_by(|left, right| right.revision().cmp(&left.revision()));
        Ok(records)
    }
}

fn lock_error(err: &impl std::fmt::Display) -> RegistryError {
    RegistryError::persistence(std::io::Error::other(format!(
        "registry store lock poisoned: {err}"
    )))
}
