//! The record contract shared by both registries.
//!
//! The next-gen and legacy registries agree on lookups and listing but
//! differ in when a record receives its revision. That difference is carried
//! in the type system as a [`RevisionPolicy`] so that allocation-only and
//! assignment-only operations are unavailable on the wrong registry.

use super::{RecordId, RecordStateError, Revision};
use crate::issue::domain::PullRequestNumber;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}
}

/// When a registry record receives its revision.
pub trait RevisionPolicy: sealed::Sealed + Send + Sync + 'static {
    /// Short policy name used in logs.
    const NAME: &'static str;
}

/// Revisions are allocated as `max + 1` when the record is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtInsert {}

/// Revisions are assigned by an operator after the record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Administrative {}

impl sealed::Sealed for AtInsert {}
impl sealed::Sealed for Administrative {}

impl RevisionPolicy for AtInsert {
    const NAME: &'static str = "at-insert";
}

impl RevisionPolicy for Administrative {
    const NAME: &'static str = "administrative";
}

/// A record stored in a registry.
pub trait RegistryRecord: Clone + Debug + Send + Sync + 'static {
    /// Everything needed to create the record except its identifier.
    type Draft: Clone + Debug + Send + Sync + 'static;

    /// When the record receives its revision.
    type Policy: RevisionPolicy;

    /// Builds the stored record once the store has assigned an identifier.
    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// Store-assigned identifier.
    fn id(&self) -> RecordId;

    /// Revision, if one has been allocated or assigned.
    fn revision(&self) -> Option<Revision>;

    /// Pull request that produced the record, if known.
    fn pull_request(&self) -> Option<PullRequestNumber>;

    /// Timestamp used for recency ordering.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// A record whose revision is assigned after creation.
pub trait AssignableRevision: RegistryRecord<Policy = Administrative> {
    /// Assigns `revision` to the record.
    ///
    /// Assigning the revision the record already carries is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStateError::RevisionAlreadyAssigned`] when the record
    /// already carries a different revision.
    fn assign_revision(&mut self, revision: Revision) -> Result<(), RecordStateError>;
}
