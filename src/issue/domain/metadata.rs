//! Values fetched from, or derived from, the source-hosting service.

use super::{IssueNumber, KeywordMatch, PullRequestNumber};
use serde::{Deserialize, Serialize};

/// Issue metadata as published by the source-hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMetadata {
    number: IssueNumber,
    title: String,
    url: String,
}

impl IssueMetadata {
    /// Creates issue metadata.
    #[must_use]
    pub fn new(number: IssueNumber, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            url: url.into(),
        }
    }

    /// Returns the issue number.
    #[must_use]
    pub const fn number(&self) -> IssueNumber {
        self.number
    }

    /// Returns the issue title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the issue URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Raw pull request fields needed for issue resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDetails {
    /// Pull request number.
    pub number: PullRequestNumber,
    /// Pull request title.
    pub title: String,
    /// Free-text body; empty when the author left none.
    pub body: String,
    /// Login of the pull request author.
    pub author: String,
}

/// Pull request metadata combined with the issue it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestMetadata {
    issue: Option<IssueMetadata>,
    resolves_issue: bool,
    title: String,
    author: String,
}

impl PullRequestMetadata {
    /// Combines a pull request with the issue named by its earliest keyword
    /// reference.
    ///
    /// `reference` and `issue` come from the same resolution pass; without a
    /// reference the pull request neither resolves nor references an issue.
    #[must_use]
    pub fn new(
        details: PullRequestDetails,
        reference: Option<KeywordMatch>,
        issue: Option<IssueMetadata>,
    ) -> Self {
        let resolves_issue = issue.is_some() && reference.is_some_and(|found| found.resolves());
        Self {
            issue,
            resolves_issue,
            title: details.title,
            author: details.author,
        }
    }

    /// Returns the referenced issue, if the body named one.
    #[must_use]
    pub const fn issue(&self) -> Option<&IssueMetadata> {
        self.issue.as_ref()
    }

    /// Returns `true` iff the pull request resolves the referenced issue.
    #[must_use]
    pub const fn resolves_issue(&self) -> bool {
        self.resolves_issue
    }

    /// Returns the pull request title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the pull request author's login.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }
}
