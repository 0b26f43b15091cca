//! Listing filters shared by both registries.

use super::{RegistryRecord, Revision};
use std::cmp::Ordering;

/// Filter, ordering and pagination for registry listings.
///
/// Results are ordered most recent first. When a minimum revision is set,
/// only records with a strictly greater revision are kept, so records
/// without a revision drop out. The limit applies after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    limit: Option<usize>,
    min_revision: Option<Revision>,
}

impl ListQuery {
    /// Creates an unbounded, unfiltered query.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            limit: None,
            min_revision: None,
        }
    }

    /// Caps the number of results. A limit of `0` means no limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = if limit == 0 { None } else { Some(limit) };
        self
    }

    /// Keeps only records whose revision is greater than `revision`.
    #[must_use]
    pub const fn after_revision(mut self, revision: Revision) -> Self {
        self.min_revision = Some(revision);
        self
    }

    /// Returns the result cap, if any.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the exclusive lower revision bound, if any.
    #[must_use]
    pub const fn min_revision(&self) -> Option<Revision> {
        self.min_revision
    }

    /// Returns `true` when `record` passes the revision filter.
    #[must_use]
    pub fn matches<R: RegistryRecord>(&self, record: &R) -> bool {
        self.min_revision.is_none_or(|min| {
            record
                .revision()
                .is_some_and(|revision| revision > min)
        })
    }

    /// Filters, orders and truncates `records`.
    #[must_use]
    pub fn apply<R: RegistryRecord>(&self, records: Vec<R>) -> Vec<R> {
        let mut kept: Vec<R> = records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect();
        kept.sort_by(most_recent_first);
        if let Some(limit) = self.limit {
            kept.truncate(limit);
        }
        kept
    }
}

/// Orders records by timestamp descending, then revision descending, then
/// insertion order descending.
#[must_use]
pub fn most_recent_first<R: RegistryRecord>(left: &R, right: &R) -> Ordering {
    right
        .timestamp()
        .cmp(&left.timestamp())
        .then_with(|| right.revision().cmp(&left.revision()))
        .then_with(|| right.id().cmp(&left.id()))
}
