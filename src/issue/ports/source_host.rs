//! Read contract for the source-hosting service.

use crate::issue::domain::{
    IssueMetadata, IssueNumber, PullRequestDetails, PullRequestNumber, RepositoryFullName,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for source-host lookups.
pub type SourceHostResult<T> = Result<T, SourceHostError>;

/// Source-hosting lookups used to resolve pull requests to issues.
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Fetches a pull request's title, body and author.
    ///
    /// # Errors
    ///
    /// Returns [`SourceHostError::NotFound`] when the pull request does not
    /// exist in `repository`.
    async fn pull_request(
        &self,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
    ) -> SourceHostResult<PullRequestDetails>;

    /// Fetches an issue's title and public URL.
    ///
    /// # Errors
    ///
    /// Returns [`SourceHostError::NotFound`] when the issue does not exist in
    /// `repository`.
    async fn issue(
        &self,
        repository: &RepositoryFullName,
        number: IssueNumber,
    ) -> SourceHostResult<IssueMetadata>;
}

/// Errors returned by source-host implementations.
#[derive(Debug, Clone, Error)]
pub enum SourceHostError {
    /// The requested resource does not exist upstream.
    #[error("{kind} #{number} not found in {repository}")]
    NotFound {
        /// Resource kind, `pull request` or `issue`.
        kind: &'static str,
        /// Requested number.
        number: u32,
        /// Repository searched.
        repository: RepositoryFullName,
    },

    /// The upstream service answered with a body that could not be read.
    #[error("malformed upstream response: {0}")]
    Malformed(String),

    /// Transport failure or unexpected upstream status.
    #[error("upstream failure: {0}")]
    Upstream(Arc<dyn std::error::Error + Send + Sync>),
}

impl SourceHostError {
    /// Builds a not-found error for a pull request.
    #[must_use]
    pub const fn pull_request_not_found(
        repository: RepositoryFullName,
        number: PullRequestNumber,
    ) -> Self {
        Self::NotFound {
            kind: "pull request",
            number: number.value(),
            repository,
        }
    }

    /// Builds a not-found error for an issue.
    #[must_use]
    pub const fn issue_not_found(repository: RepositoryFullName, number: IssueNumber) -> Self {
        Self::NotFound {
            kind: "issue",
            number: number.value(),
            repository,
        }
    }

    /// Wraps a transport error.
    pub fn upstream(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Upstream(Arc::new(err))
    }
}
