//! Port contract for starting CI release jobs.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Job that builds and publishes next-gen releases.
pub const NEXT_GEN_RELEASE_JOB: &str = "apsim-release";

/// Job that builds and publishes legacy releases.
pub const CLASSIC_RELEASE_JOB: &str = "oldapsim-release";

/// A parameterised CI job invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseJob {
    name: String,
    parameters: Vec<(String, String)>,
}

impl ReleaseJob {
    /// Creates an invocation of job `name` with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Appends a job parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((key.into(), value.into()));
        self
    }

    /// Returns the job name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the job parameters in insertion order.
    #[must_use]
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Returns the value of parameter `key`, if set.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Starts CI jobs.
#[async_trait]
pub trait CiTrigger: Send + Sync {
    /// Queues `job` on the CI server.
    ///
    /// # Errors
    ///
    /// Returns [`CiTriggerError::Rejected`] when the server refuses the
    /// request, or [`CiTriggerError::Transport`] when it cannot be reached.
    async fn trigger(&self, job: &ReleaseJob) -> Result<(), CiTriggerError>;
}

/// Errors returned by CI trigger implementations.
#[derive(Debug, Clone, Error)]
pub enum CiTriggerError {
    /// The server answered with a failure status.
    #[error("CI server rejected job {job} with status {status}")]
    Rejected {
        /// Job that was requested.
        job: String,
        /// HTTP status code returned.
        status: u16,
    },

    /// The server could not be reached.
    #[error("CI transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl CiTriggerError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
