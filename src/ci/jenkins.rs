//! Jenkins implementation of the CI trigger port.

use super::{CiTrigger, CiTriggerError, ReleaseJob};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

/// Triggers parameterised Jenkins jobs through remote build tokens.
#[derive(Clone)]
pub struct JenkinsTrigger {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for JenkinsTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JenkinsTrigger")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl JenkinsTrigger {
    /// Creates a trigger for the Jenkins server at `base_url` using a remote
    /// build `token`.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        }
    }

    /// Returns the `buildWithParameters` endpoint for `job`.
    #[must_use]
    pub fn job_url(&self, job: &ReleaseJob) -> String {
        format!("{}/job/{}/buildWithParameters", self.base_url, job.name())
    }
}

#[async_trait]
impl CiTrigger for JenkinsTrigger {
    async fn trigger(&self, job: &ReleaseJob) -> Result<(), CiTriggerError> {
        let url = self.job_url(job);
        let mut query: Vec<(&str, &str)> = vec![("token", self.token.as_str())];
        query.extend(
            job.parameters()
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(CiTriggerError::transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(job = job.name(), %status, "Jenkins rejected release job");
            return Err(CiTriggerError::Rejected {
                job: job.name().to_owned(),
                status: status.as_u16(),
            });
        }

        info!(job = job.name(), "queued release job");
        Ok(())
    }
}
