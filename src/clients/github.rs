//! GitHub pull request client
//!
//! A fetch issues six requests at once (metadata, diff, issue comments,
//! inline review comments, reviews, files). Any failed request fails the
//! whole fetch.

use async_trait::async_trait;
use serde_json::Value;

use super::{ClientError, PullRequest, PullRequestComment, PullRequestSource, ReviewComment};
use crate::urls::PullRequestRef;

/// Default REST API root
pub const GITHUB_API_BASE: &str = "https://api.github.com";

const JSON_ACCEPT: &str = "application/vnd.github.v3+json";
const DIFF_ACCEPT: &str = "application/vnd.github.v3.diff";
const USER_AGENT: &str = concat!("ticket-summarizer/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client (token auth)
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base(token, GITHUB_API_BASE)
    }

    /// Client against a different API root (GitHub Enterprise)
    pub fn with_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn pull_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_base, pr.owner, pr.repo, pr.number
        )
    }

    fn issue_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}",
            self.api_base, pr.owner, pr.repo, pr.number
        )
    }

    async fn get(
        &self,
        url: String,
        accept: &str,
        label: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", accept)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                service: format!("GitHub {}", label),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_json(&self, url: String, label: &str) -> Result<Value, ClientError> {
        Ok(self.get(url, JSON_ACCEPT, label).await?.json().await?)
    }

    async fn get_text(&self, url: String, label: &str) -> Result<String, ClientError> {
        Ok(self.get(url, DIFF_ACCEPT, label).await?.text().await?)
    }
}

fn login(item: &Value) -> String {
    item.pointer("/user/login")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn str_field(item: &Value, field: &str) -> String {
    item.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn as_list<'a>(value: &'a Value, what: &str) -> Result<&'a Vec<Value>, ClientError> {
    value
        .as_array()
        .ok_or_else(|| ClientError::invalid("GitHub API", format!("{} is not an array", what)))
}

/// Raw responses of one fetch
#[derive(Debug, Clone, Default)]
pub struct PullRequestPayloads {
    pub pull: Value,
    pub diff: String,
    pub issue_comments: Value,
    pub review_comments: Value,
    pub reviews: Value,
    pub files: Value,
}

/// Assemble the bundle from the six responses
///
/// Review summaries with a body come first among review comments (path
/// left empty), followed by inline comments with their file path.
pub fn assemble_pull_request(payloads: PullRequestPayloads) -> Result<PullRequest, ClientError> {
    let title = payloads
        .pull
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::invalid("GitHub API", "pull request has no title"))?
        .to_string();
    let description = str_field(&payloads.pull, "body");

    let comments = as_list(&payloads.issue_comments, "issue comments")?
        .iter()
        .map(|c| PullRequestComment {
            author: login(c),
            body: str_field(c, "body"),
        })
        .collect();

    let mut review_comments: Vec<ReviewComment> = as_list(&payloads.reviews, "reviews")?
        .iter()
        .filter(|r| r.get("body").and_then(Value::as_str).is_some_and(|b| !b.is_empty()))
        .map(|r| ReviewComment {
            author: login(r),
            body: str_field(r, "body"),
            path: String::new(),
        })
        .collect();

    review_comments.extend(
        as_list(&payloads.review_comments, "review comments")?
            .iter()
            .map(|c| ReviewComment {
                author: login(c),
                body: str_field(c, "body"),
                path: str_field(c, "path"),
            }),
    );

    let changed_files = as_list(&payloads.files, "files")?
        .iter()
        .filter_map(|f| f.get("filename").and_then(Value::as_str))
        .map(str::to_string)
        .collect();

    Ok(PullRequest {
        title,
        description,
        diff: payloads.diff,
        comments,
        review_comments,
        changed_files,
    })
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn fetch_pull_request(
        &self,
        pr: &PullRequestRef,
    ) -> Result<PullRequest, ClientError> {
        let pull_url = self.pull_url(pr);
        let issue_url = self.issue_url(pr);

        let (pull, diff, issue_comments, review_comments, reviews, files) = tokio::try_join!(
            self.get_json(pull_url.clone(), "API"),
            self.get_text(pull_url.clone(), "diff"),
            self.get_json(format!("{}/comments", issue_url), "comments"),
            self.get_json(format!("{}/comments", pull_url), "review comments"),
            self.get_json(format!("{}/reviews", pull_url), "reviews"),
            self.get_json(format!("{}/files", pull_url), "files"),
        )?;

        assemble_pull_request(PullRequestPayloads {
            pull,
            diff,
            issue_comments,
            review_comments,
            reviews,
            files,
        })
    }
}
