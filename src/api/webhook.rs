//! Intake of source-host "pull request closed" webhooks.

use super::{ApiError, ApiResult};
use crate::ci::{CLASSIC_RELEASE_JOB, CiTrigger, NEXT_GEN_RELEASE_JOB, ReleaseJob};
use crate::issue::{
    domain::{PullRequestNumber, RepositoryFullName},
    ports::SourceHost,
    services::IssueResolver,
};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    pull_request: Option<MergedPullRequest>,
}

#[derive(Debug, Deserialize)]
struct MergedPullRequest {
    number: u32,
    #[serde(default)]
    merged: bool,
    #[serde(default)]
    merge_commit_sha: Option<String>,
    user: PullRequestUser,
}

#[derive(Debug, Deserialize)]
struct PullRequestUser {
    login: String,
}

/// Why a webhook delivery did not start a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The pull request was closed without merging.
    NotMerged,
    /// The pull request does not resolve an issue.
    NoResolvedIssue,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMerged => f.write_str("Ignored: pull request is not merged"),
            Self::NoResolvedIssue => {
                f.write_str("Ignored: pull request does not resolve an issue")
            }
        }
    }
}

/// Result of a well-formed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Nothing was started.
    Ignored(IgnoreReason),
    /// The release job was queued.
    Triggered(ReleaseJob),
}

impl fmt::Display for WebhookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored(reason) => fmt::Display::fmt(reason, f),
            Self::Triggered(_) => f.write_str("Initiated a release build of apsim"),
        }
    }
}

/// Starts a release job when a pull request that resolves an issue is
/// merged.
pub struct WebhookIntake<H: SourceHost, T: CiTrigger> {
    resolver: IssueResolver<H>,
    trigger: Arc<T>,
    repository: RepositoryFullName,
    job: &'static str,
    sends_issue_number: bool,
}

impl<H: SourceHost, T: CiTrigger> WebhookIntake<H, T> {
    /// Creates the intake for next-gen merges, which queue the
    /// `apsim-release` job.
    #[must_use]
    pub fn next_gen(resolver: IssueResolver<H>, trigger: Arc<T>) -> Self {
        Self {
            resolver,
            trigger,
            repository: RepositoryFullName::apsim_next_gen(),
            job: NEXT_GEN_RELEASE_JOB,
            sends_issue_number: true,
        }
    }

    /// Creates the intake for legacy merges, which queue the
    /// `oldapsim-release` job.
    #[must_use]
    pub fn classic(resolver: IssueResolver<H>, trigger: Arc<T>) -> Self {
        Self {
            resolver,
            trigger,
            repository: RepositoryFullName::apsim_classic(),
            job: CLASSIC_RELEASE_JOB,
            sends_issue_number: false,
        }
    }

    /// Replaces the repository pull requests are resolved against.
    #[must_use]
    pub fn with_repository(mut self, repository: RepositoryFullName) -> Self {
        self.repository = repository;
        self
    }

    /// Handles one raw webhook payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Invalid`] for an empty or unreadable payload, or
    /// one without a pull request. Source-host and CI failures map to
    /// [`ApiError::NotFound`] or [`ApiError::UpstreamFailure`].
    pub async fn pull_request_merged(&self, payload: &str) -> ApiResult<WebhookOutcome> {
        if payload.trim().is_empty() {
            return Err(ApiError::invalid("Empty payload"));
        }
        let event: PullRequestEvent = serde_json::from_str(payload)
            .map_err(|err| ApiError::invalid(format!("unreadable payload: {err}")))?;
        let Some(pull_request) = event.pull_request else {
            return Err(ApiError::invalid("Payload does not contain a pull request"));
        };

        let number = PullRequestNumber::new(pull_request.number);
        if !pull_request.merged {
            info!(pull_request = %number, "ignoring unmerged pull request");
            return Ok(WebhookOutcome::Ignored(IgnoreReason::NotMerged));
        }

        let metadata = self.resolver.get_metadata(number, &self.repository).await?;
        let Some(issue) = metadata.issue().filter(|_| metadata.resolves_issue()) else {
            info!(pull_request = %number, "ignoring pull request that resolves no issue");
            return Ok(WebhookOutcome::Ignored(IgnoreReason::NoResolvedIssue));
        };

        let mut job = ReleaseJob::new(self.job);
        if self.sends_issue_number {
            job = job.with_parameter("ISSUE_NUMBER", issue.number().to_string());
        }
        job = job
            .with_parameter("PULL_ID", number.to_string())
            .with_parameter("COMMIT_AUTHOR", pull_request.user.login)
            .with_parameter("ISSUE_TITLE", issue.title())
            .with_parameter("RELEASED", "true")
            .with_parameter(
                "MERGE_COMMIT",
                pull_request.merge_commit_sha.unwrap_or_default(),
            );

        self.trigger.trigger(&job).await?;
        info!(
            job = self.job,
            pull_request = %number,
            issue = %issue.number(),
            "triggered release build"
        );
        Ok(WebhookOutcome::Triggered(job))
    }
}
