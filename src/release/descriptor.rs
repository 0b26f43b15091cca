//! Version strings, installer names and public links for releases.

use super::{Platform, Release, ReleaseError};
use crate::issue::domain::IssueNumber;
use crate::registry::domain::{Revision, UpgradeRecord};
use chrono::{DateTime, Datelike, Utc};

/// Base URL installers are published under.
pub const INSTALLER_BASE_URL: &str = "https://apsimdev.apsim.info/ApsimXFiles";

/// Base URL of the public next-gen download endpoint.
pub const DOWNLOAD_API_URL: &str = "https://builds.apsim.info/api/nextgen/download";

/// Base URL of the next-gen issue tracker.
pub const ISSUE_BASE_URL: &str = "https://github.com/APSIMInitiative/ApsimX/issues";

/// Pure formatting of release metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    installer_base_url: String,
    download_api_url: String,
    issue_base_url: String,
}

impl Default for ReleaseDescriptor {
    fn default() -> Self {
        Self::new(INSTALLER_BASE_URL, DOWNLOAD_API_URL, ISSUE_BASE_URL)
    }
}

impl ReleaseDescriptor {
    /// Creates a descriptor over custom base URLs.
    ///
    /// Trailing slashes are ignored.
    #[must_use]
    pub fn new(
        installer_base_url: impl Into<String>,
        download_api_url: impl Into<String>,
        issue_base_url: impl Into<String>,
    ) -> Self {
        Self {
            installer_base_url: trim_base(&installer_base_url.into()),
            download_api_url: trim_base(&download_api_url.into()),
            issue_base_url: trim_base(&issue_base_url.into()),
        }
    }

    /// Formats `{year}.{month:02}.{revision}.0` from a release date.
    ///
    /// # Examples
    ///
    ///     use apsim_builds::registry::domain::Revision;
    ///     use apsim_builds::release::ReleaseDescriptor;
    ///     use chrono::{TimeZone, Utc};
    ///
    ///     let date = Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).single().expect("valid date");
    ///     let version = ReleaseDescriptor::version_string(date, Revision::new(7421));
    ///     assert_eq!(version, "2024.03.7421.0");
    #[must_use]
    pub fn version_string(release_date: DateTime<Utc>, revision: Revision) -> String {
        format!(
            "{}.{:02}.{revision}.0",
            release_date.year(),
            release_date.month()
        )
    }

    /// Formats the version string of a stored upgrade.
    #[must_use]
    pub fn version_string_for(upgrade: &UpgradeRecord) -> String {
        Self::version_string(upgrade.release_date(), upgrade.revision())
    }

    /// Returns `apsim-{revision}.{ext}` for the platform's extension.
    #[must_use]
    pub fn installer_file_name(revision: Revision, platform: Platform) -> String {
        format!("apsim-{revision}.{}", platform.extension())
    }

    /// Extracts the revision from a version string.
    ///
    /// The revision is the last dot-separated component that is not `0`, so
    /// `2024.03.7421.0` and a bare `7421` both yield revision 7421.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseError::InvalidVersion`] when no such component exists
    /// or it is not a number.
    pub fn parse_version(version: &str) -> Result<Revision, ReleaseError> {
        version
            .split('.')
            .map(str::trim)
            .filter(|component| *component != "0")
            .next_back()
            .and_then(|component| component.parse::<u32>().ok())
            .map(Revision::new)
            .ok_or_else(|| ReleaseError::InvalidVersion(version.to_owned()))
    }

    /// Returns the direct URL of a published installer.
    #[must_use]
    pub fn download_url(&self, revision: Revision, platform: Platform) -> String {
        format!(
            "{}/{}",
            self.installer_base_url,
            Self::installer_file_name(revision, platform)
        )
    }

    /// Returns the public API link that serves an installer.
    #[must_use]
    pub fn download_link(&self, revision: Revision, platform: Platform) -> String {
        format!("{}/{revision}/{platform}", self.download_api_url)
    }

    /// Returns the public URL of an issue.
    #[must_use]
    pub fn info_url(&self, issue: IssueNumber) -> String {
        format!("{}/{issue}", self.issue_base_url)
    }

    /// Builds the public view of an upgrade.
    #[must_use]
    pub fn release(&self, upgrade: &UpgradeRecord) -> Release {
        let revision = upgrade.revision();
        Release {
            release_date: upgrade.release_date(),
            issue: upgrade.issue_number(),
            title: upgrade.issue_title().to_owned(),
            download_link_debian: self.download_link(revision, Platform::Linux),
            download_link_windows: self.download_link(revision, Platform::Windows),
            download_link_mac_os: self.download_link(revision, Platform::MacOS),
            info_url: self.info_url(upgrade.issue_number()),
            version: Self::version_string_for(upgrade),
            revision,
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}
