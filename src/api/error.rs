//! Error taxonomy shared by every operation handler.

use crate::ci::CiTriggerError;
use crate::issue::ports::SourceHostError;
use crate::registry::ports::RegistryError;
use crate::release::ReleaseError;
use std::sync::Arc;
use thiserror::Error;

/// Result type for operation handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Coarse failure category a hosting layer maps onto its responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested record or file does not exist.
    NotFound,
    /// The request collides with existing state.
    Conflict,
    /// The request itself is malformed or unusable.
    Invalid,
    /// A collaborator service failed.
    UpstreamFailure,
    /// Persistence or other infrastructure failure.
    Internal,
}

/// Errors returned by operation handlers.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The requested record or file does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request collides with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request is malformed or unusable.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// A collaborator service failed.
    #[error("upstream failure: {0}")]
    UpstreamFailure(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence or other infrastructure failure.
    #[error("internal error: {0}")]
    Internal(Arc<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    /// Builds an [`ApiError::Invalid`] from a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(_) => Self::NotFound(err.to_string()),
            RegistryError::ZeroRevision => Self::Invalid(err.to_string()),
            RegistryError::RevisionTaken { .. }
            | RegistryError::State(_)
            | RegistryError::Contention => Self::Conflict(err.to_string()),
            RegistryError::RevisionOverflow | RegistryError::Persistence(_) => {
                Self::Internal(Arc::new(err))
            }
        }
    }
}

impl From<SourceHostError> for ApiError {
    fn from(err: SourceHostError) -> Self {
        match err {
            SourceHostError::NotFound { .. } => Self::NotFound(err.to_string()),
            SourceHostError::Malformed(_) | SourceHostError::Upstream(_) => {
                Self::UpstreamFailure(Arc::new(err))
            }
        }
    }
}

impl From<CiTriggerError> for ApiError {
    fn from(err: CiTriggerError) -> Self {
        Self::UpstreamFailure(Arc::new(err))
    }
}

impl From<ReleaseError> for ApiError {
    fn from(err: ReleaseError) -> Self {
        Self::Invalid(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(err.to_string())
        } else {
            Self::Internal(Arc::new(err))
        }
    }
}
