//! Runtime configuration
//!
//! Resolution priority:
//! 1. `--config <path>` TOML file (values may be `env:NAME` references)
//! 2. Environment variables (`SLACK_TOKEN`, `JIRA_TOKEN`, ...)
//! 3. A `.env` file in the working directory or one of its parents;
//!    variables already set in the process environment win
//!
//! Empty values count as unset. The Jira credentials and the local
//! repository path are required; every other source is optional and a
//! missing credential simply disables that source.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Required keys, reported by their environment variable names
const REQUIRED_VARS: [&str; 3] = ["JIRA_TOKEN", "JIRA_EMAIL", "LOCAL_REPO_PATH"];

/// Default executable for the generative backend
pub const DEFAULT_CLAUDE_COMMAND: &str = "claude";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Resolved configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub slack_token: Option<String>,
    pub confluence_token: Option<String>,
    pub confluence_base_url: Option<String>,
    pub confluence_email: Option<String>,
    pub jira_token: String,
    pub jira_email: String,
    pub github_token: Option<String>,
    /// Working copy searched for importers and read for file contents
    pub local_repo_path: PathBuf,
    /// Model passed to the backend; `None` keeps the engine default
    pub claude_model: Option<String>,
    pub claude_command: String,
}

/// On-disk form; every key optional so the environment can fill gaps
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    slack_token: Option<String>,
    confluence_token: Option<String>,
    confluence_base_url: Option<String>,
    confluence_email: Option<String>,
    jira_token: Option<String>,
    jira_email: Option<String>,
    github_token: Option<String>,
    local_repo_path: Option<String>,
    claude_model: Option<String>,
    claude_command: Option<String>,
}

impl Config {
    /// Load configuration from an optional file plus the process environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                        path: path.display().to_string(),
                        source,
                    })?;
                toml::from_str(&content)?
            }
            None => ConfigFile::default(),
        };

        let dotenv = read_dotenv(None);
        Self::resolve(file, with_dotenv(|key| std::env::var(key).ok(), dotenv))
    }

    /// Load configuration from a TOML string and an explicit variable lookup
    pub fn from_toml_str<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: ConfigFile = toml::from_str(content)?;
        Self::resolve(file, lookup)
    }

    /// Load configuration from variables only
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(ConfigFile::default(), lookup)
    }

    fn resolve<F>(file: ConfigFile, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |from_file: Option<String>, var: &str| -> Option<String> {
            from_file
                .map(|value| resolve_env_ref(&value, &lookup))
                .or_else(|| lookup(var))
                .filter(|value| !value.is_empty())
        };

        let jira_token = pick(file.jira_token, "JIRA_TOKEN");
        let jira_email = pick(file.jira_email, "JIRA_EMAIL");
        let local_repo_path = pick(file.local_repo_path, "LOCAL_REPO_PATH");

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .zip([&jira_token, &jira_email, &local_repo_path])
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.to_string())
            .collect();

        match (jira_token, jira_email, local_repo_path) {
            (Some(jira_token), Some(jira_email), Some(local_repo_path)) => Ok(Config {
                slack_token: pick(file.slack_token, "SLACK_TOKEN"),
                confluence_token: pick(file.confluence_token, "CONFLUENCE_TOKEN"),
                confluence_base_url: pick(file.confluence_base_url, "CONFLUENCE_BASE_URL"),
                confluence_email: pick(file.confluence_email, "CONFLUENCE_EMAIL"),
                jira_token,
                jira_email,
                github_token: pick(file.github_token, "GITHUB_TOKEN"),
                local_repo_path: PathBuf::from(local_repo_path),
                claude_model: pick(file.claude_model, "CLAUDE_MODEL"),
                claude_command: pick(file.claude_command, "CLAUDE_COMMAND")
                    .unwrap_or_else(|| DEFAULT_CLAUDE_COMMAND.to_string()),
            }),
            _ => Err(ConfigError::MissingVariables(missing)),
        }
    }

    /// Slack token, when chat threads can be fetched
    pub fn slack_credentials(&self) -> Option<&str> {
        self.slack_token.as_deref()
    }

    /// Confluence `(base_url, email, token)`; all three are needed
    pub fn confluence_credentials(&self) -> Option<(&str, &str, &str)> {
        match (
            &self.confluence_base_url,
            &self.confluence_email,
            &self.confluence_token,
        ) {
            (Some(base_url), Some(email), Some(token)) => {
                Some((base_url.as_str(), email.as_str(), token.as_str()))
            }
            _ => None,
        }
    }

    /// GitHub token, when pull requests can be fetched
    pub fn github_credentials(&self) -> Option<&str> {
        self.github_token.as_deref()
    }
}

/// Variables from a `.env` file
///
/// `None` searches the working directory and its parents. A missing
/// file yields nothing; malformed lines are skipped.
pub fn read_dotenv(path: Option<&Path>) -> HashMap<String, String> {
    let iter = match path {
        Some(path) => dotenvy::from_path_iter(path),
        None => dotenvy::dotenv_iter(),
    };
    match iter {
        Ok(iter) => iter
            .filter_map(|item| match item {
                Ok(pair) => Some(pair),
                Err(e) => {
                    debug!("skipping .env line: {}", e);
                    None
                }
            })
            .collect(),
        Err(e) => {
            debug!("no .env file loaded: {}", e);
            HashMap::new()
        }
    }
}

/// Layer `.env` values under `lookup`; set variables are never overridden
pub fn with_dotenv<F>(
    lookup: F,
    dotenv: HashMap<String, String>,
) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key: &str| lookup(key).or_else(|| dotenv.get(key).cloned())
}

/// Resolve `env:NAME` references; other values pass through unchanged
fn resolve_env_ref<F>(value: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match value.strip_prefix("env:") {
        Some(name) => lookup(name).unwrap_or_default(),
        None => value.to_string(),
    }
}
