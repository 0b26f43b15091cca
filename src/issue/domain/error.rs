//! Error types for source-hosting value validation.

use thiserror::Error;

/// Errors returned while constructing issue-domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IssueDomainError {
    /// The repository name does not follow `owner/repo` format.
    #[error("invalid repository name '{0}', expected owner/repo")]
    InvalidRepository(String),
}
