//! Errors for release formatting and parsing.

use thiserror::Error;

/// Errors returned while describing releases.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReleaseError {
    /// The platform name is not one installers are built for.
    #[error("unsupported platform '{0}', expected Linux, MacOS or Windows")]
    UnsupportedPlatform(String),

    /// The version string carries no usable revision.
    #[error("invalid version '{0}'")]
    InvalidVersion(String),
}
