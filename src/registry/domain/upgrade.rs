//! Next-gen upgrade records.

use super::{AtInsert, RecordId, RegistryRecord, Revision};
use crate::issue::domain::{IssueNumber, PullRequestNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to publish a next-gen upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUpgrade {
    issue_number: IssueNumber,
    pull_request_number: PullRequestNumber,
    issue_title: String,
    issue_url: String,
}

impl NewUpgrade {
    /// Creates a request for the given issue and pull request.
    #[must_use]
    pub fn new(
        issue_number: IssueNumber,
        pull_request_number: PullRequestNumber,
        issue_title: impl Into<String>,
    ) -> Self {
        Self {
            issue_number,
            pull_request_number,
            issue_title: issue_title.into(),
            issue_url: String::new(),
        }
    }

    /// Sets the public issue URL.
    #[must_use]
    pub fn with_issue_url(mut self, issue_url: impl Into<String>) -> Self {
        self.issue_url = issue_url.into();
        self
    }

    /// Returns the resolved issue.
    #[must_use]
    pub const fn issue_number(&self) -> IssueNumber {
        self.issue_number
    }

    /// Returns the merged pull request.
    #[must_use]
    pub const fn pull_request_number(&self) -> PullRequestNumber {
        self.pull_request_number
    }

    /// Returns the issue title.
    #[must_use]
    pub fn issue_title(&self) -> &str {
        &self.issue_title
    }

    /// Returns the issue URL.
    #[must_use]
    pub fn issue_url(&self) -> &str {
        &self.issue_url
    }
}

/// An upgrade ready for insertion: the request plus its allocated revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeDraft {
    request: NewUpgrade,
    release_date: DateTime<Utc>,
    revision: Revision,
}

impl UpgradeDraft {
    /// Combines a request with its creation time and revision.
    #[must_use]
    pub const fn new(request: NewUpgrade, release_date: DateTime<Utc>, revision: Revision) -> Self {
        Self {
            request,
            release_date,
            revision,
        }
    }

    /// Returns the originating request.
    #[must_use]
    pub const fn request(&self) -> &NewUpgrade {
        &self.request
    }

    /// Returns the creation time.
    #[must_use]
    pub const fn release_date(&self) -> DateTime<Utc> {
        self.release_date
    }

    /// Returns the allocated revision.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }
}

/// Parameters for reconstructing an upgrade from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUpgradeData {
    /// Store identifier.
    pub id: RecordId,
    /// Resolved issue.
    pub issue_number: IssueNumber,
    /// Merged pull request.
    pub pull_request_number: PullRequestNumber,
    /// Issue title at release time.
    pub issue_title: String,
    /// Public issue URL; may be empty.
    pub issue_url: String,
    /// Creation or release time.
    pub release_date: DateTime<Utc>,
    /// Allocated revision.
    pub revision: Revision,
    /// Whether the upgrade has been marked released.
    pub released: bool,
}

/// A published next-gen upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeRecord {
    id: RecordId,
    issue_number: IssueNumber,
    pull_request_number: PullRequestNumber,
    issue_title: String,
    issue_url: String,
    release_date: DateTime<Utc>,
    revision: Revision,
    released: bool,
}

impl UpgradeRecord {
    /// Reconstructs an upgrade from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUpgradeData) -> Self {
        let PersistedUpgradeData {
            id,
            issue_number,
            pull_request_number,
            issue_title,
            issue_url,
            release_date,
            revision,
            released,
        } = data;
        Self {
            id,
            issue_number,
            pull_request_number,
            issue_title,
            issue_url,
            release_date,
            revision,
            released,
        }
    }

    /// Returns the store identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the resolved issue.
    #[must_use]
    pub const fn issue_number(&self) -> IssueNumber {
        self.issue_number
    }

    /// Returns the merged pull request.
    #[must_use]
    pub const fn pull_request_number(&self) -> PullRequestNumber {
        self.pull_request_number
    }

    /// Returns the issue title.
    #[must_use]
    pub fn issue_title(&self) -> &str {
        &self.issue_title
    }

    /// Returns the issue URL.
    #[must_use]
    pub fn issue_url(&self) -> &str {
        &self.issue_url
    }

    /// Returns the release date.
    #[must_use]
    pub const fn release_date(&self) -> DateTime<Utc> {
        self.release_date
    }

    /// Returns the allocated revision.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }

    /// Returns `true` once the upgrade has been marked released.
    #[must_use]
    pub const fn is_released(&self) -> bool {
        self.released
    }

    /// Marks the upgrade released at `at`.
    ///
    /// Returns `false`, leaving the record untouched, when it was already
    /// released.
    pub const fn mark_released(&mut self, at: DateTime<Utc>) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.release_date = at;
        true
    }
}

impl RegistryRecord for UpgradeRecord {
    type Draft = UpgradeDraft;
    type Policy = AtInsert;

    fn from_draft(id: RecordId, draft: Self::Draft) -> Self {
        let UpgradeDraft {
            request,
            release_date,
            revision,
        } = draft;
        Self {
            id,
            issue_number: request.issue_number,
            pull_request_number: request.pull_request_number,
            issue_title: request.issue_title,
            issue_url: request.issue_url,
            release_date,
            revision,
            released: false,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn revision(&self) -> Option<Revision> {
        Some(self.revision)
    }

    fn pull_request(&self) -> Option<PullRequestNumber> {
        Some(self.pull_request_number)
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.release_date
    }
}
