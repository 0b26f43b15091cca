//! Legacy build registry operations.

use super::{ApiError, ApiResult};
use crate::issue::{
    domain::{PullRequestNumber, RepositoryFullName},
    ports::SourceHost,
    services::IssueResolver,
};
use crate::registry::{
    domain::{BuildRecord, NewBuild, RecordId, Revision},
    ports::RegistryStore,
    services::BuildRegistry,
};
use mockable::Clock;
use tracing::warn;

/// Handlers for the legacy build endpoints.
pub struct LegacyApi<S, H, C>
where
    S: RegistryStore<BuildRecord>,
    H: SourceHost,
    C: Clock + Send + Sync,
{
    registry: BuildRegistry<S, C>,
    resolver: IssueResolver<H>,
    repository: RepositoryFullName,
}

impl<S, H, C> LegacyApi<S, H, C>
where
    S: RegistryStore<BuildRecord>,
    H: SourceHost,
    C: Clock + Send + Sync,
{
    /// Creates the handlers for the `APSIMInitiative/APSIMClassic`
    /// repository.
    #[must_use]
    pub fn new(registry: BuildRegistry<S, C>, resolver: IssueResolver<H>) -> Self {
        Self {
            registry,
            resolver,
            repository: RepositoryFullName::apsim_classic(),
        }
    }

    /// Replaces the repository pull requests are resolved against.
    #[must_use]
    pub fn with_repository(mut self, repository: RepositoryFullName) -> Self {
        self.repository = repository;
        self
    }

    /// Returns the underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &BuildRegistry<S, C> {
        &self.registry
    }

    /// Registers a CI build of `pull_request` and returns its identifier.
    ///
    /// The build takes its author from the pull request and its title and
    /// bug number from the referenced issue.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the pull request or its issue is
    /// unknown upstream, [`ApiError::Invalid`] when the pull request names
    /// no issue, or [`ApiError::UpstreamFailure`] for source-host failures.
    pub async fn add_build(
        &self,
        pull_request: PullRequestNumber,
        jenkins_id: u32,
    ) -> ApiResult<RecordId> {
        let metadata = self
            .resolver
            .get_metadata(pull_request, &self.repository)
            .await?;
        let Some(issue) = metadata.issue() else {
            warn!(
                pull_request = %pull_request,
                jenkins_id,
                "build requested for pull request without issue"
            );
            return Err(ApiError::invalid(format!(
                "pull request #{pull_request} does not reference an issue"
            )));
        };

        let build = self
            .registry
            .insert(NewBuild {
                author: metadata.author().to_owned(),
                title: issue.title().to_owned(),
                bug_id: issue.number(),
                jenkins_id,
                pull_request_id: Some(pull_request),
            })
            .await?;
        Ok(build.id())
    }

    /// Records whether a build passed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown build and
    /// [`ApiError::Conflict`] when the build already finished.
    pub async fn update_build(&self, id: RecordId, passed: bool) -> ApiResult<BuildRecord> {
        Ok(self.registry.record_result(id, passed).await?)
    }

    /// Records the number of regression diffs for a build.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown build.
    pub async fn set_num_diffs(&self, id: RecordId, num_diffs: u32) -> ApiResult<BuildRecord> {
        Ok(self.registry.set_num_diffs(id, num_diffs).await?)
    }

    /// Assigns `revision` to the latest build of `pull_request`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no build matches and
    /// [`ApiError::Conflict`] when the revision belongs to another build or
    /// the build already carries a different revision.
    pub async fn set_revision(
        &self,
        pull_request: PullRequestNumber,
        revision: Revision,
    ) -> ApiResult<BuildRecord> {
        Ok(self.registry.set_revision(pull_request, revision).await?)
    }

    /// Returns the highest assigned revision, or `0` when none is.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] for store failures.
    pub async fn get_revision(&self) -> ApiResult<Revision> {
        Ok(self.registry.latest_revision().await?)
    }

    /// Lists passed builds that carry a revision, highest first.
    ///
    /// A non-positive `limit` means unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] for store failures.
    pub async fn list(&self, limit: i64) -> ApiResult<Vec<BuildRecord>> {
        let cap = if limit > 0 {
            usize::try_from(limit).unwrap_or(usize::MAX)
        } else {
            0
        };
        Ok(self.registry.released_builds(cap).await?)
    }
}
