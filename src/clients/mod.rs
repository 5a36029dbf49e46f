//! External collaborators
//!
//! One trait per external system the pipeline talks to, plus the HTTP
//! implementations. The pipeline only sees the traits; tests substitute
//! in-memory fakes.

pub mod confluence;
pub mod github;
pub mod html;
pub mod jira;
pub mod slack;

pub use confluence::ConfluenceClient;
pub use github::GitHubClient;
pub use html::strip_html;
pub use jira::{summary_to_adf, JiraClient};
pub use slack::SlackClient;

use async_trait::async_trait;

use crate::llm::types::SummaryDocument;
use crate::urls::{ConfluencePageRef, IssueRef, PullRequestRef, SlackThreadRef};

/// Collaborator errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("{service} error: {status}")]
    Status { service: String, status: u16 },

    /// Non-2xx response whose body is worth surfacing
    #[error("{service} error: {status} - {body}")]
    Rejected {
        service: String,
        status: u16,
        body: String,
    },

    /// 2xx response reporting failure in its payload
    #[error("{service} error: {message}")]
    Api { service: String, message: String },

    #[error("Invalid {service} response: {message}")]
    InvalidResponse { service: String, message: String },
}

impl ClientError {
    pub(crate) fn invalid(service: &str, message: impl Into<String>) -> Self {
        ClientError::InvalidResponse {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: String,
    pub text: String,
    pub timestamp: String,
}

/// Messages of one chat thread, in thread order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatThread {
    pub messages: Vec<ChatMessage>,
}

/// Wiki page reduced to plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPage {
    pub title: String,
    pub body: String,
}

/// General (conversation) comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestComment {
    pub author: String,
    pub body: String,
}

/// Review comment; `path` is empty for review summaries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewComment {
    pub author: String,
    pub body: String,
    pub path: String,
}

/// Everything fetched for one pull request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PullRequest {
    pub title: String,
    pub description: String,
    pub diff: String,
    pub comments: Vec<PullRequestComment>,
    pub review_comments: Vec<ReviewComment>,
    pub changed_files: Vec<String>,
}

/// Chat thread source (Slack)
#[async_trait]
pub trait ChatSource: Send + Sync {
    async fn fetch_thread(&self, thread: &SlackThreadRef) -> Result<ChatThread, ClientError>;
}

/// Wiki page source (Confluence)
#[async_trait]
pub trait WikiSource: Send + Sync {
    async fn fetch_page(&self, page: &ConfluencePageRef) -> Result<WikiPage, ClientError>;
}

/// Pull request source (GitHub)
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn fetch_pull_request(&self, pr: &PullRequestRef)
        -> Result<PullRequest, ClientError>;
}

/// Issue tracker sink (Jira)
#[async_trait]
pub trait IssueWriter: Send + Sync {
    /// Append `summary` to the issue as a comment
    async fn add_comment(
        &self,
        issue: &IssueRef,
        summary: &SummaryDocument,
    ) -> Result<(), ClientError>;
}
