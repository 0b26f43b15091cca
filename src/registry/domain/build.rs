//! Legacy CI build records.

use super::{
    Administrative, AssignableRevision, RecordId, RecordStateError, RegistryRecord, Revision,
};
use crate::issue::domain::{IssueNumber, PullRequestNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a legacy CI build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildOutcome {
    /// The build is still running.
    #[default]
    Pending,
    /// The build passed.
    Passed,
    /// The build failed.
    Failed,
}

impl BuildOutcome {
    /// Maps the persisted tri-state pass flag.
    #[must_use]
    pub const fn from_pass(pass: Option<bool>) -> Self {
        match pass {
            None => Self::Pending,
            Some(true) => Self::Passed,
            Some(false) => Self::Failed,
        }
    }

    /// Returns the tri-state pass flag.
    #[must_use]
    pub const fn as_pass(self) -> Option<bool> {
        match self {
            Self::Pending => None,
            Self::Passed => Some(true),
            Self::Failed => Some(false),
        }
    }
}

/// Request to register a legacy build at CI start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBuild {
    /// Pull request author.
    pub author: String,
    /// Title of the referenced issue.
    pub title: String,
    /// Referenced issue.
    pub bug_id: IssueNumber,
    /// CI job number.
    pub jenkins_id: u32,
    /// Pull request under test.
    pub pull_request_id: Option<PullRequestNumber>,
}

/// A build ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDraft {
    request: NewBuild,
    start_time: DateTime<Utc>,
}

impl BuildDraft {
    /// Stamps a request with its start time.
    #[must_use]
    pub const fn new(request: NewBuild, start_time: DateTime<Utc>) -> Self {
        Self {
            request,
            start_time,
        }
    }

    /// Returns the originating request.
    #[must_use]
    pub const fn request(&self) -> &NewBuild {
        &self.request
    }

    /// Returns the start time.
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }
}

/// Parameters for reconstructing a build from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBuildData {
    /// Store identifier.
    pub id: RecordId,
    /// Pull request author.
    pub author: String,
    /// Issue title.
    pub title: String,
    /// Referenced issue.
    pub bug_id: IssueNumber,
    /// Build result.
    pub outcome: BuildOutcome,
    /// CI start time.
    pub start_time: DateTime<Utc>,
    /// CI finish time.
    pub finish_time: Option<DateTime<Utc>>,
    /// Number of regression diffs.
    pub num_diffs: Option<u32>,
    /// Administratively assigned revision.
    pub revision: Option<Revision>,
    /// CI job number.
    pub jenkins_id: u32,
    /// Pull request under test.
    pub pull_request_id: Option<PullRequestNumber>,
}

/// A legacy CI build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    id: RecordId,
    author: String,
    title: String,
    bug_id: IssueNumber,
    outcome: BuildOutcome,
    start_time: DateTime<Utc>,
    finish_time: Option<DateTime<Utc>>,
    num_diffs: Option<u32>,
    revision: Option<Revision>,
    jenkins_id: u32,
    pull_request_id: Option<PullRequestNumber>,
}

impl BuildRecord {
    /// Reconstructs a build from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedBuildData) -> Self {
        let PersistedBuildData {
            id,
            author,
            title,
            bug_id,
            outcome,
            start_time,
            finish_time,
            num_diffs,
            revision,
            jenkins_id,
            pull_request_id,
        } = data;
        Self {
            id,
            author,
            title,
            bug_id,
            outcome,
            start_time,
            finish_time,
            num_diffs,
            revision,
            jenkins_id,
            pull_request_id,
        }
    }

    /// Returns the store identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the pull request author.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the issue title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the referenced issue.
    #[must_use]
    pub const fn bug_id(&self) -> IssueNumber {
        self.bug_id
    }

    /// Returns the build result.
    #[must_use]
    pub const fn outcome(&self) -> BuildOutcome {
        self.outcome
    }

    /// Returns the CI start time.
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Returns the CI finish time, once recorded.
    #[must_use]
    pub const fn finish_time(&self) -> Option<DateTime<Utc>> {
        self.finish_time
    }

    /// Returns the regression diff count, once recorded.
    #[must_use]
    pub const fn num_diffs(&self) -> Option<u32> {
        self.num_diffs
    }

    /// Returns the assigned revision, if any.
    #[must_use]
    pub const fn revision(&self) -> Option<Revision> {
        self.revision
    }

    /// Returns the CI job number.
    #[must_use]
    pub const fn jenkins_id(&self) -> u32 {
        self.jenkins_id
    }

    /// Returns the pull request under test, if known.
    #[must_use]
    pub const fn pull_request_id(&self) -> Option<PullRequestNumber> {
        self.pull_request_id
    }

    /// Records the build result at `at`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStateError::BuildAlreadyFinished`] when a result was
    /// already recorded.
    pub fn record_result(
        &mut self,
        passed: bool,
        at: DateTime<Utc>,
    ) -> Result<(), RecordStateError> {
        if self.outcome != BuildOutcome::Pending || self.finish_time.is_some() {
            return Err(RecordStateError::BuildAlreadyFinished(self.id));
        }
        self.outcome = if passed {
            BuildOutcome::Passed
        } else {
            BuildOutcome::Failed
        };
        self.finish_time = Some(at);
        Ok(())
    }

    /// Records the number of regression diffs.
    pub const fn set_num_diffs(&mut self, num_diffs: u32) {
        self.num_diffs = Some(num_diffs);
    }
}

impl RegistryRecord for BuildRecord {
    type Draft = BuildDraft;
    type Policy = Administrative;

    fn from_draft(id: RecordId, draft: Self::Draft) -> Self {
        let BuildDraft { request, start_time } = draft;
        Self {
            id,
            author: request.author,
            title: request.title,
            bug_id: request.bug_id,
            outcome: BuildOutcome::Pending,
            start_time,
            finish_time: None,
            num_diffs: None,
            revision: None,
            jenkins_id: request.jenkins_id,
            pull_request_id: request.pull_request_id,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn revision(&self) -> Option<Revision> {
        self.revision
    }

    fn pull_request(&self) -> Option<PullRequestNumber> {
        self.pull_request_id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.start_time
    }
}

impl AssignableRevision for BuildRecord {
    fn assign_revision(&mut self, revision: Revision) -> Result<(), RecordStateError> {
        match self.revision {
            Some(current) if current == revision => Ok(()),
            Some(current) => Err(RecordStateError::RevisionAlreadyAssigned {
                id: self.id,
                revision: current,
            }),
            None => {
                self.revision = Some(revision);
                Ok(())
            }
        }
    }
}
