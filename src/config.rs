//! Environment configuration.

use crate::api::PublishedFiles;
use crate::ci::JenkinsTrigger;
use crate::issue::adapters::{GITHUB_API_URL, GitHubSourceHost};
use crate::registry::adapters::postgres::RegistryPgPool;
use camino::Utf8PathBuf;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use reqwest::Client;
use std::env::{self, VarError};
use thiserror::Error;

/// `PostgreSQL` connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Root directory of the published documentation sites.
pub const DOCUMENTATION_PATH_ENV: &str = "DOCUMENTATION_PATH";
/// Root directory of the published installers.
pub const INSTALLERS_PATH_ENV: &str = "INSTALLERS_PATH";
/// GitHub personal access token.
pub const GITHUB_PAT_ENV: &str = "GITHUB_PAT";
/// Optional GitHub REST API base URL.
pub const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";
/// Jenkins server base URL.
pub const JENKINS_URL_ENV: &str = "JENKINS_URL";
/// Remote build token of the next-gen release job.
pub const JENKINS_TOKEN_NG_ENV: &str = "JENKINS_TOKEN_NG";
/// Remote build token of the legacy release job.
pub const JENKINS_TOKEN_CLASSIC_ENV: &str = "JENKINS_TOKEN_CLASSIC";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set to an unusable value.
    #[error("invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Service configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Directory holding one documentation site per pull request.
    pub documentation_path: Utf8PathBuf,
    /// Directory holding the published installers.
    pub installers_path: Utf8PathBuf,
    /// GitHub personal access token.
    pub github_pat: String,
    /// GitHub REST API base URL.
    pub github_api_url: String,
    /// Jenkins server base URL.
    pub jenkins_url: String,
    /// Remote build token for the next-gen release job.
    pub jenkins_token_next_gen: String,
    /// Remote build token for the legacy release job.
    pub jenkins_token_classic: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("documentation_path", &self.documentation_path)
            .field("installers_path", &self.installers_path)
            .field("github_api_url", &self.github_api_url)
            .field("jenkins_url", &self.jenkins_url)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Values are trimmed and blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for an unset required variable and
    /// [`ConfigError::Invalid`] for a value that is not Unicode or not an
    /// HTTP(S) URL where one is expected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required(DATABASE_URL_ENV)?,
            documentation_path: required(DOCUMENTATION_PATH_ENV)?.into(),
            installers_path: required(INSTALLERS_PATH_ENV)?.into(),
            github_pat: required(GITHUB_PAT_ENV)?,
            github_api_url: http_url(
                GITHUB_API_URL_ENV,
                optional(GITHUB_API_URL_ENV)?
                    .as_deref()
                    .unwrap_or(GITHUB_API_URL),
            )?,
            jenkins_url: http_url(JENKINS_URL_ENV, &required(JENKINS_URL_ENV)?)?,
            jenkins_token_next_gen: required(JENKINS_TOKEN_NG_ENV)?,
            jenkins_token_classic: required(JENKINS_TOKEN_CLASSIC_ENV)?,
        })
    }

    /// Builds the GitHub source host authenticated by the access token.
    #[must_use]
    pub fn github_source_host(&self, client: Client) -> GitHubSourceHost {
        GitHubSourceHost::new(client, self.github_api_url.as_str(), self.github_pat.as_str())
    }

    /// Builds the trigger for the next-gen release job.
    #[must_use]
    pub fn next_gen_trigger(&self, client: Client) -> JenkinsTrigger {
        JenkinsTrigger::new(
            client,
            self.jenkins_url.as_str(),
            self.jenkins_token_next_gen.as_str(),
        )
    }

    /// Builds the trigger for the legacy release job.
    #[must_use]
    pub fn classic_trigger(&self, client: Client) -> JenkinsTrigger {
        JenkinsTrigger::new(
            client,
            self.jenkins_url.as_str(),
            self.jenkins_token_classic.as_str(),
        )
    }

    /// Builds a connection pool over `database_url`.
    ///
    /// Connections are opened on first use, so an unreachable database
    /// surfaces from the first registry operation.
    #[must_use]
    pub fn registry_pool(&self, max_size: u32) -> RegistryPgPool {
        Pool::builder()
            .max_size(max_size)
            .min_idle(Some(0))
            .build_unchecked(ConnectionManager::<PgConnection>::new(
                self.database_url.as_str(),
            ))
    }

    /// Opens the installer and documentation directories.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while opening either directory.
    pub fn published_files(&self) -> std::io::Result<PublishedFiles> {
        PublishedFiles::open(&self.installers_path, &self.documentation_path)
    }
}

fn optional(name: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
        }
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::Invalid {
            name,
            reason: "value is not valid Unicode".to_owned(),
        }),
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name)?.ok_or(ConfigError::Missing(name))
}

fn http_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.trim_end_matches('/').to_owned())
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("expected an http(s) URL, got {value:?}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn complete_env() -> Vec<(&'static str, Option<&'static str>)> {
        vec![
            (DATABASE_URL_ENV, Some("postgres://builds@localhost/builds")),
            (DOCUMENTATION_PATH_ENV, Some("/srv/docs")),
            (INSTALLERS_PATH_ENV, Some(" /srv/installers ")),
            (GITHUB_PAT_ENV, Some("ghp_secret")),
            (GITHUB_API_URL_ENV, None),
            (JENKINS_URL_ENV, Some("https://jenkins.example.org/")),
            (JENKINS_TOKEN_NG_ENV, Some("ng-token")),
            (JENKINS_TOKEN_CLASSIC_ENV, Some("classic-token")),
        ]
    }

    fn with_override(
        name: &'static str,
        value: Option<&'static str>,
    ) -> Vec<(&'static str, Option<&'static str>)> {
        complete_env()
            .into_iter()
            .map(|(key, current)| if key == name { (key, value) } else { (key, current) })
            .collect()
    }

    #[test]
    fn from_env_reads_complete_configuration() {
        temp_env::with_vars(complete_env(), || {
            let config = Config::from_env().expect("config should load");
            assert_eq!(config.database_url, "postgres://builds@localhost/builds");
            assert_eq!(config.documentation_path, Utf8PathBuf::from("/srv/docs"));
            assert_eq!(config.installers_path, Utf8PathBuf::from("/srv/installers"));
            assert_eq!(config.github_api_url, GITHUB_API_URL);
            assert_eq!(config.jenkins_url, "https://jenkins.example.org");
            assert_eq!(config.jenkins_token_next_gen, "ng-token");
            assert_eq!(config.jenkins_token_classic, "classic-token");
        });
    }

    #[test]
    fn from_env_prefers_configured_github_api_url() {
        temp_env::with_vars(
            with_override(GITHUB_API_URL_ENV, Some("http://localhost:8080/api/")),
            || {
                let config = Config::from_env().expect("config should load");
                assert_eq!(config.github_api_url, "http://localhost:8080/api");
            },
        );
    }

    #[rstest]
    #[case(DATABASE_URL_ENV)]
    #[case(DOCUMENTATION_PATH_ENV)]
    #[case(INSTALLERS_PATH_ENV)]
    #[case(GITHUB_PAT_ENV)]
    #[case(JENKINS_URL_ENV)]
    #[case(JENKINS_TOKEN_NG_ENV)]
    #[case(JENKINS_TOKEN_CLASSIC_ENV)]
    fn from_env_rejects_unset_required_variable(#[case] name: &'static str) {
        temp_env::with_vars(with_override(name, None), || {
            assert_eq!(Config::from_env(), Err(ConfigError::Missing(name)));
        });
    }

    #[test]
    fn from_env_treats_blank_values_as_missing() {
        temp_env::with_vars(with_override(GITHUB_PAT_ENV, Some("   ")), || {
            assert_eq!(Config::from_env(), Err(ConfigError::Missing(GITHUB_PAT_ENV)));
        });
    }

    #[test]
    fn from_env_rejects_non_http_jenkins_url() {
        temp_env::with_vars(with_override(JENKINS_URL_ENV, Some("jenkins.local")), || {
            let err = Config::from_env().expect_err("config should be rejected");
            assert!(matches!(
                err,
                ConfigError::Invalid {
                    name: JENKINS_URL_ENV,
                    ..
                }
            ));
        });
    }

    fn sample_config(root: &Utf8PathBuf) -> Config {
        Config {
            database_url: "postgres://builds@localhost:1/builds".to_owned(),
            documentation_path: root.join("docs"),
            installers_path: root.join("installers"),
            github_pat: "ghp_secret".to_owned(),
            github_api_url: "http://localhost:8080/api".to_owned(),
            jenkins_url: "https://jenkins.example.org".to_owned(),
            jenkins_token_next_gen: "ng-token".to_owned(),
            jenkins_token_classic: "classic-token".to_owned(),
        }
    }

    #[test]
    fn builds_collaborators_from_configuration() {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("utf-8 path");
        std::fs::create_dir_all(root.join("docs")).expect("docs dir");
        std::fs::create_dir_all(root.join("installers")).expect("installers dir");
        let config = sample_config(&root);

        let host = format!("{:?}", config.github_source_host(Client::new()));
        let trigger = config.next_gen_trigger(Client::new());
        let job = crate::ci::ReleaseJob::new(crate::ci::NEXT_GEN_RELEASE_JOB);
        let files = config.published_files().expect("published files");
        let pool = config.registry_pool(4);

        assert!(host.contains("http://localhost:8080/api"));
        assert!(!host.contains("ghp_secret"));
        assert!(
            trigger
                .job_url(&job)
                .starts_with("https://jenkins.example.org/job/")
        );
        assert!(!format!("{:?}", config.classic_trigger(Client::new())).contains("classic-token"));
        assert_eq!(files.installers.root(), root.join("installers").as_path());
        assert_eq!(pool.max_size(), 4);
        assert_eq!(pool.state().connections, 0);
    }

    #[test]
    fn published_files_reports_missing_directory() {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("utf-8 path");

        assert!(sample_config(&root).published_files().is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        temp_env::with_vars(complete_env(), || {
            let config = Config::from_env().expect("config should load");
            let rendered = format!("{config:?}");
            assert!(!rendered.contains("ghp_secret"));
            assert!(!rendered.contains("ng-token"));
            assert!(!rendered.contains("postgres://"));
        });
    }
}
