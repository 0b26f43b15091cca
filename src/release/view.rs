//! Public view of a next-gen release.

use crate::issue::domain::IssueNumber;
use crate::registry::domain::Revision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A release as presented to client installers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Release date.
    pub release_date: DateTime<Utc>,
    /// Resolved issue.
    pub issue: IssueNumber,
    /// Issue title.
    pub title: String,
    /// Download link for the Debian package.
    pub download_link_debian: String,
    /// Download link for the Windows installer.
    pub download_link_windows: String,
    /// Download link for the macOS disk image.
    #[serde(rename = "downloadLinkMacOS")]
    pub download_link_mac_os: String,
    /// Issue URL.
    pub info_url: String,
    /// Version string.
    pub version: String,
    /// Revision, also embedded in the version string.
    pub revision: Revision,
}
