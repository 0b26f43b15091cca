//! In-memory source host for tests and local wiring.

use crate::issue::{
    domain::{
        IssueMetadata, IssueNumber, PullRequestDetails, PullRequestNumber, RepositoryFullName,
    },
    ports::{SourceHost, SourceHostError, SourceHostResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct InMemorySourceHostState {
    pull_requests: HashMap<(RepositoryFullName, PullRequestNumber), PullRequestDetails>,
    issues: HashMap<(RepositoryFullName, IssueNumber), IssueMetadata>,
}

/// Thread-safe in-memory source host.
#[derive(Debug, Clone, Default)]
pub struct InMemorySourceHost {
    state: Arc<RwLock<InMemorySourceHostState>>,
}

impl InMemorySourceHost {
    /// Creates an empty source host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a pull request in `repository`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceHostError::Upstream`] when the internal lock is
    /// poisoned.
    pub fn add_pull_request(
        &self,
        repository: &RepositoryFullName,
        details: PullRequestDetails,
    ) -> SourceHostResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state
            .pull_requests
            .insert((repository.clone(), details.number), details);
        Ok(())
    }

    /// Publishes an issue in `repository`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceHostError::Upstream`] when the internal lock is
    /// poisoned.
    pub fn add_issue(
        &self,
        repository: &RepositoryFullName,
        issue: IssueMetadata,
    ) -> SourceHostResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state
            .issues
            .insert((repository.clone(), issue.number()), issue);
        Ok(())
    }
}

#[async_trait]
impl SourceHost for InMemorySourceHost {
    async fn pull_request(
        &self,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
    ) -> SourceHostResult<PullRequestDetails> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        state
            .pull_requests
            .get(&(repository.clone(), number))
            .cloned()
            .ok_or_else(|| SourceHostError::pull_request_not_found(repository.clone(), number))
    }

    async fn issue(
        &self,
        repository: &RepositoryFullName,
        number: IssueNumber,
    ) -> SourceHostResult<IssueMetadata> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        state
            .issues
            .get(&(repository.clone(), number))
            .cloned()
            .ok_or_else(|| SourceHostError::issue_not_found(repository.clone(), number))
    }
}

fn lock_error(err: &impl std::fmt::Display) -> SourceHostError {
    SourceHostError::upstream(std::io::Error::other(format!(
        "source host lock poisoned: {err}"
    )))
}
