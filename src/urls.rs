//! URL parsers
//!
//! Turns the URLs given on the command line into typed references for
//! the chat, wiki, pull-request and issue-tracker clients.

use regex::Regex;
use std::sync::OnceLock;

/// A URL did not have the shape its source kind expects
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlFormatError {
    #[error("Invalid Slack URL: {0}")]
    Slack(String),

    #[error("Invalid Confluence URL: {0}")]
    Confluence(String),

    #[error("Invalid GitHub PR URL: {0}")]
    GitHub(String),

    #[error("Invalid Jira URL: {0}")]
    Jira(String),
}

/// Slack thread reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackThreadRef {
    pub workspace: String,
    pub channel_id: String,
    /// Thread timestamp in API form (`1234567890.123456`)
    pub thread_ts: String,
}

/// Confluence page reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfluencePageRef {
    /// `<origin>/wiki`
    pub base_url: String,
    pub page_id: String,
}

/// GitHub pull request reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// Jira issue reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    /// `https://<host>`
    pub base_url: String,
    pub issue_key: String,
}

fn slack_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https://([^.]+)\.slack\.com/archives/([A-Z0-9]+)/p(\d+)$")
            .expect("static regex")
    })
}

fn confluence_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/wiki/(?:spaces/[^/]+/)?pages/(\d+)").expect("static regex")
    })
}

fn github_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https://github\.com/([^/]+)/([^/]+)/pull/(\d+)").expect("static regex")
    })
}

fn jira_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(https://[^/]+)/browse/([A-Z][A-Z0-9_]+-\d+)").expect("static regex")
    })
}

/// Parse a Slack thread URL
///
/// `https://myteam.slack.com/archives/C01ABC23DEF/p1234567890123456`
pub fn parse_slack_url(url: &str) -> Result<SlackThreadRef, UrlFormatError> {
    let caps = slack_pattern()
        .captures(url)
        .ok_or_else(|| UrlFormatError::Slack(url.to_string()))?;

    let raw_ts = &caps[3];
    // p1234567890123456 -> 1234567890.123456
    if raw_ts.len() <= 6 {
        return Err(UrlFormatError::Slack(url.to_string()));
    }
    let (secs, micros) = raw_ts.split_at(raw_ts.len() - 6);

    Ok(SlackThreadRef {
        workspace: caps[1].to_string(),
        channel_id: caps[2].to_string(),
        thread_ts: format!("{}.{}", secs, micros),
    })
}

/// Parse a Confluence page URL
///
/// Accepts both `/wiki/spaces/<SPACE>/pages/<id>/<title>` and the short
/// `/wiki/pages/<id>` form.
pub fn parse_confluence_url(url: &str) -> Result<ConfluencePageRef, UrlFormatError> {
    let parsed =
        reqwest::Url::parse(url).map_err(|_| UrlFormatError::Confluence(url.to_string()))?;

    let caps = confluence_pattern()
        .captures(parsed.path())
        .ok_or_else(|| UrlFormatError::Confluence(url.to_string()))?;

    Ok(ConfluencePageRef {
        base_url: format!("{}/wiki", parsed.origin().ascii_serialization()),
        page_id: caps[1].to_string(),
    })
}

/// Parse a GitHub pull request URL (trailing segments such as `/files` are allowed)
pub fn parse_github_pr_url(url: &str) -> Result<PullRequestRef, UrlFormatError> {
    let caps = github_pattern()
        .captures(url)
        .ok_or_else(|| UrlFormatError::GitHub(url.to_string()))?;

    let number = caps[3]
        .parse::<u64>()
        .map_err(|_| UrlFormatError::GitHub(url.to_string()))?;

    Ok(PullRequestRef {
        owner: caps[1].to_string(),
        repo: caps[2].to_string(),
        number,
    })
}

/// Parse a Jira issue URL (`https://xxx.atlassian.net/browse/PROJ-123`)
pub fn parse_jira_url(url: &str) -> Result<IssueRef, UrlFormatError> {
    let caps = jira_pattern()
        .captures(url)
        .ok_or_else(|| UrlFormatError::Jira(url.to_string()))?;

    Ok(IssueRef {
        base_url: caps[1].to_string(),
        issue_key: caps[2].to_string(),
    })
}
