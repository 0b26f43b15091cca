//! Installer target platforms.

use super::ReleaseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform an installer targets.
///
/// # Examples
///
///     use apsim_builds::release::Platform;
///
///     let platform: Platform = "macos".parse().expect("known platform");
///     assert_eq!(platform, Platform::MacOS);
///     assert_eq!(platform.extension(), "dmg");
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    /// Debian package.
    Linux,
    /// Disk image.
    MacOS,
    /// Windows executable.
    Windows,
}

impl Platform {
    /// Every supported platform.
    pub const ALL: [Self; 3] = [Self::Linux, Self::MacOS, Self::Windows];

    /// Returns the installer file extension, without a leading period.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Linux => "deb",
            Self::MacOS => "dmg",
            Self::Windows => "exe",
        }
    }

    /// Returns the canonical platform name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::MacOS => "MacOS",
            Self::Windows => "Windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ReleaseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|platform| platform.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ReleaseError::UnsupportedPlatform(value.to_owned()))
    }
}
