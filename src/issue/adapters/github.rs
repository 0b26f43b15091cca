//! GitHub REST v3 implementation of the source-host port.

use crate::issue::{
    domain::{
        IssueMetadata, IssueNumber, PullRequestDetails, PullRequestNumber, RepositoryFullName,
    },
    ports::{SourceHost, SourceHostError, SourceHostResult},
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Default GitHub REST API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("apsim-builds/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    title: String,
    body: Option<String>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

/// Issue fields read from the REST payload.
///
/// `url` is the REST resource URL of the issue, which is what the registry
/// records; the browser URL is derived from the issue number when releases
/// are rendered.
#[derive(Debug, Deserialize)]
struct IssueResponse {
    title: String,
    url: String,
}

/// Source host backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHubSourceHost {
    client: Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for GitHubSourceHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSourceHost")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GitHubSourceHost {
    /// Creates a client against `api_url` authenticated by a personal access
    /// token.
    #[must_use]
    pub fn new(client: Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        }
    }

    async fn get(&self, path: &str) -> SourceHostResult<Option<Response>> {
        let url = format!("{}/{path}", self.api_url);
        debug!(%url, "fetching from GitHub");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(SourceHostError::upstream)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        response
            .error_for_status()
            .map(Some)
            .map_err(|err| {
                warn!(%url, error = %err, "GitHub request failed");
                SourceHostError::upstream(err)
            })
    }
}

async fn read_body(response: Response) -> SourceHostResult<Vec<u8>> {
    let bytes = response.bytes().await.map_err(SourceHostError::upstream)?;
    Ok(bytes.to_vec())
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> SourceHostResult<T> {
    serde_json::from_slice(bytes).map_err(|err| SourceHostError::Malformed(err.to_string()))
}

/// Decodes a pull request payload; a missing body reads as empty.
pub(crate) fn pull_request_details(
    number: PullRequestNumber,
    payload: &[u8],
) -> SourceHostResult<PullRequestDetails> {
    let body: PullRequestResponse = parse_json(payload)?;
    Ok(PullRequestDetails {
        number,
        title: body.title,
        body: body.body.unwrap_or_default(),
        author: body.user.login,
    })
}

/// Decodes an issue payload.
pub(crate) fn issue_metadata(
    number: IssueNumber,
    payload: &[u8],
) -> SourceHostResult<IssueMetadata> {
    let body: IssueResponse = parse_json(payload)?;
    Ok(IssueMetadata::new(number, body.title, body.url))
}

#[async_trait]
impl SourceHost for GitHubSourceHost {
    async fn pull_request(
        &self,
        repository: &RepositoryFullName,
        number: PullRequestNumber,
    ) -> SourceHostResult<PullRequestDetails> {
        let path = format!("repos/{repository}/pulls/{number}");
        let Some(response) = self.get(&path).await? else {
            return Err(SourceHostError::pull_request_not_found(
                repository.clone(),
                number,
            ));
        };

        pull_request_details(number, &read_body(response).await?)
    }

    async fn issue(
        &self,
        repository: &RepositoryFullName,
        number: IssueNumber,
    ) -> SourceHostResult<IssueMetadata> {
        let path = format!("repos/{repository}/issues/{number}");
        let Some(response) = self.get(&path).await? else {
            return Err(SourceHostError::issue_not_found(repository.clone(), number));
        };

        issue_metadata(number, &read_body(response).await?)
    }
}
