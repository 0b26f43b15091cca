//! Next-gen registry operations.

use super::{ApiError, ApiResult, PublishedFiles};
use crate::issue::{
    domain::{PullRequestNumber, RepositoryFullName},
    ports::SourceHost,
    services::IssueResolver,
};
use crate::registry::{
    domain::{ListQuery, NewUpgrade, Revision, UpgradeRecord},
    ports::RegistryStore,
    services::UpgradeRegistry,
};
use crate::release::{Platform, Release, ReleaseDescriptor};
use camino::{Utf8Path, Utf8PathBuf};
use mockable::Clock;
use tracing::{debug, info, warn};

/// Handlers for the next-gen release endpoints.
pub struct NextGenApi<S, H, C>
where
    S: RegistryStore<UpgradeRecord>,
    H: SourceHost,
    C: Clock + Send + Sync,
{
    registry: UpgradeRegistry<S, C>,
    resolver: IssueResolver<H>,
    files: PublishedFiles,
    repository: RepositoryFullName,
    descriptor: ReleaseDescriptor,
}

impl<S, H, C> NextGenApi<S, H, C>
where
    S: RegistryStore<UpgradeRecord>,
    H: SourceHost,
    C: Clock + Send + Sync,
{
    /// Creates the handlers for the `APSIMInitiative/ApsimX` repository.
    #[must_use]
    pub fn new(
        registry: UpgradeRegistry<S, C>,
        resolver: IssueResolver<H>,
        files: PublishedFiles,
    ) -> Self {
        Self {
            registry,
            resolver,
            files,
            repository: RepositoryFullName::apsim_next_gen(),
            descriptor: ReleaseDescriptor::default(),
        }
    }

    /// Replaces the repository pull requests are resolved against.
    #[must_use]
    pub fn with_repository(mut self, repository: RepositoryFullName) -> Self {
        self.repository = repository;
        self
    }

    /// Replaces the link formatting.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: ReleaseDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Returns the underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &UpgradeRegistry<S, C> {
        &self.registry
    }

    /// Registers the release produced by merging `pull_request`.
    ///
    /// The pull request is resolved before anything is written, so an
    /// upstream failure leaves the registry untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the pull request or its issue is
    /// unknown upstream, [`ApiError::Invalid`] when the pull request names
    /// no issue, [`ApiError::UpstreamFailure`] for source-host failures and
    /// [`ApiError::Conflict`] when revision allocation kept colliding.
    pub async fn add_build(&self, pull_request: PullRequestNumber) -> ApiResult<UpgradeRecord> {
        let metadata = self
            .resolver
            .get_metadata(pull_request, &self.repository)
            .await?;
        let Some(issue) = metadata.issue() else {
            warn!(
                pull_request = %pull_request,
                "release requested for pull request without issue"
            );
            return Err(ApiError::invalid(format!(
                "pull request #{pull_request} does not reference an issue"
            )));
        };

        let request = NewUpgrade::new(issue.number(), pull_request, issue.title())
            .with_issue_url(issue.url());
        Ok(self.registry.insert(request).await?)
    }

    /// Lists releases most recent first.
    ///
    /// `limit` caps the number of releases and `min_revision` keeps only
    /// releases above it; negative values mean unbounded.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] for store failures.
    pub async fn list_releases(&self, limit: i64, min_revision: i64) -> ApiResult<Vec<Release>> {
        let mut query = ListQuery::new();
        if limit > 0 {
            query = query.with_limit(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        if min_revision >= 0 {
            query = query.after_revision(Revision::new(
                u32::try_from(min_revision).unwrap_or(u32::MAX),
            ));
        }

        let upgrades = self.registry.list(query).await?;
        debug!(count = upgrades.len(), "listed releases");
        Ok(upgrades
            .iter()
            .map(|upgrade| self.descriptor.release(upgrade))
            .collect())
    }

    /// Returns the revision the next release will receive.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] for store failures.
    pub async fn next_version(&self) -> ApiResult<Revision> {
        Ok(self.registry.next_revision().await?)
    }

    /// Marks the latest release for `pull_request` as released now.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when no release matches.
    pub async fn release_upgrade(
        &self,
        pull_request: PullRequestNumber,
    ) -> ApiResult<UpgradeRecord> {
        Ok(self.registry.mark_released(pull_request).await?)
    }

    /// Returns the path of the installer for `revision` on `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for an unknown platform name and
    /// [`ApiError::NotFound`] when the installer was never published.
    pub fn installer_location(&self, revision: Revision, platform: &str) -> ApiResult<Utf8PathBuf> {
        let target: Platform = platform.parse()?;
        let file_name = ReleaseDescriptor::installer_file_name(revision, target);
        let path = self.files.installers.locate(Utf8Path::new(&file_name))?;
        info!(revision = %revision, platform = %target, "serving installer");
        Ok(path)
    }

    /// Returns the path of the documentation site for `version`.
    ///
    /// A missing or blank version selects the latest release.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for an unparseable version and
    /// [`ApiError::NotFound`] when no release holds the revision or its
    /// documentation was never published.
    pub async fn documentation_location(&self, version: Option<&str>) -> ApiResult<Utf8PathBuf> {
        let revision = match version.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) => ReleaseDescriptor::parse_version(text)?,
            None => self.registry.latest_revision().await?,
        };

        let upgrade = self.registry.find_by_revision(revision).await?;
        let site = Utf8PathBuf::from(upgrade.pull_request_number().to_string()).join("index.html");
        self.files.documentation.locate(&site)
    }
}
