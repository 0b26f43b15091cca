//! Resolves a pull request to the issue its body references.

use crate::issue::{
    domain::{KeywordResolver, PullRequestMetadata, PullRequestNumber, RepositoryFullName},
    ports::{SourceHost, SourceHostResult},
};
use std::sync::Arc;
use tracing::{debug, info};

/// Combines source-host lookups with keyword scanning.
#[derive(Debug)]
pub struct IssueResolver<H: SourceHost> {
    host: Arc<H>,
    keywords: KeywordResolver,
}

impl<H: SourceHost> Clone for IssueResolver<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            keywords: self.keywords.clone(),
        }
    }
}

impl<H: SourceHost> IssueResolver<H> {
    /// Creates a resolver using the standard keyword set.
    #[must_use]
    pub fn new(host: Arc<H>) -> Self {
        Self::with_keywords(host, KeywordResolver::default())
    }

    /// Creates a resolver with a custom keyword scanner.
    #[must_use]
    pub const fn with_keywords(host: Arc<H>, keywords: KeywordResolver) -> Self {
        Self { host, keywords }
    }

    /// Fetches a pull request and the issue named by its earliest keyword
    /// reference.
    ///
    /// A body without any keyword reference yields metadata with no issue.
    ///
    /// # Errors
    ///
    /// Returns [`crate::issue::ports::SourceHostError::NotFound`] when the
    /// pull request, or the issue it references, does not exist upstream.
    /// Transport and decoding failures are propagated unchanged.
    pub async fn get_metadata(
        &self,
        pull_request: PullRequestNumber,
        repository: &RepositoryFullName,
    ) -> SourceHostResult<PullRequestMetadata> {
        let details = self.host.pull_request(repository, pull_request).await?;
        let reference = self.keywords.resolve(&details.body);

        let issue = match reference {
            Some(found) => {
                info!(
                    %repository,
                    pull_request = %pull_request,
                    issue = %found.issue(),
                    resolves = found.resolves(),
                    "pull request references issue"
                );
                Some(self.host.issue(repository, found.issue()).await?)
            }
            None => {
                debug!(
                    %repository,
                    pull_request = %pull_request,
                    "pull request body has no issue reference"
                );
                None
            }
        };

        Ok(PullRequestMetadata::new(details, reference, issue))
    }
}
