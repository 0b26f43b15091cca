//! Diesel row models for registry persistence.

use super::schema::{apsimx_upgrades, oldapsim_builds};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for upgrade records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = apsimx_upgrades)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpgradeRow {
    /// Store-assigned identifier.
    pub id: i64,
    /// Resolved issue number.
    pub issue_number: i64,
    /// Merged pull request number.
    pub pull_request_number: i64,
    /// Issue title.
    pub issue_title: String,
    /// Public issue URL.
    pub issue_url: String,
    /// Creation or release timestamp.
    pub release_date: DateTime<Utc>,
    /// Allocated revision.
    pub revision: i64,
    /// Released flag.
    pub released: bool,
}

/// Insert model for upgrade records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = apsimx_upgrades)]
pub struct NewUpgradeRow {
    /// Resolved issue number.
    pub issue_number: i64,
    /// Merged pull request number.
    pub pull_request_number: i64,
    /// Issue title.
    pub issue_title: String,
    /// Public issue URL.
    pub issue_url: String,
    /// Creation timestamp.
    pub release_date: DateTime<Utc>,
    /// Allocated revision.
    pub revision: i64,
    /// Released flag.
    pub released: bool,
}

/// Mutable upgrade columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = apsimx_upgrades)]
pub struct UpgradeChangeset {
    /// Release timestamp.
    pub release_date: DateTime<Utc>,
    /// Allocated revision.
    pub revision: i64,
    /// Released flag.
    pub released: bool,
}

/// Query result row for build records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = oldapsim_builds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BuildRow {
    /// Store-assigned identifier.
    pub id: i64,
    /// Pull request author.
    pub author: String,
    /// Issue title.
    pub title: String,
    /// Referenced issue number.
    pub bug_id: i64,
    /// Tri-state build result.
    pub pass: Option<bool>,
    /// CI start timestamp.
    pub start_time: DateTime<Utc>,
    /// CI finish timestamp.
    pub finish_time: Option<DateTime<Utc>>,
    /// Regression diff count.
    pub num_diffs: Option<i64>,
    /// Assigned revision.
    pub revision_number: Option<i64>,
    /// CI job number.
    pub jenkins_id: i64,
    /// Pull request under test.
    pub pull_request_id: Option<i64>,
}

/// Insert model for build records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = oldapsim_builds)]
pub struct NewBuildRow {
    /// Pull request author.
    pub author: String,
    /// Issue title.
    pub title: String,
    /// Referenced issue number.
    pub bug_id: i64,
    /// CI start timestamp.
    pub start_time: DateTime<Utc>,
    /// CI job number.
    pub jenkins_id: i64,
    /// Pull request under test.
    pub pull_request_id: Option<i64>,
}

/// Mutable build columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = oldapsim_builds)]
#[diesel(treat_none_as_null = true)]
pub struct BuildChangeset {
    /// Tri-state build result.
    pub pass: Option<bool>,
    /// CI finish timestamp.
    pub finish_time: Option<DateTime<Utc>>,
    /// Regression diff count.
    pub num_diffs: Option<i64>,
    /// Assigned revision.
    pub revision_number: Option<i64>,
}
