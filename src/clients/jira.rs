//! Jira issue client and ADF rendering
//!
//! The summary is written as one issue comment in Atlassian Document
//! Format.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ClientError, IssueWriter};
use crate::llm::types::SummaryDocument;
use crate::urls::IssueRef;

const SERVICE: &str = "Jira API";

fn heading(text: &str, level: u8) -> Value {
    json!({
        "type": "heading",
        "attrs": { "level": level },
        "content": [{ "type": "text", "text": text }]
    })
}

fn paragraph(text: &str) -> Value {
    json!({
        "type": "paragraph",
        "content": [{ "type": "text", "text": text }]
    })
}

fn bullet_list(items: &[String]) -> Value {
    let content: Vec<Value> = items
        .iter()
        .map(|item| json!({ "type": "listItem", "content": [paragraph(item)] }))
        .collect();
    json!({ "type": "bulletList", "content": content })
}

/// Render the summary as an ADF document
pub fn summary_to_adf(summary: &SummaryDocument) -> Value {
    let mut content = vec![
        heading(&summary.title, 1),
        heading("Background", 2),
        paragraph(&summary.background),
        heading("Problem", 2),
        paragraph(&summary.problem),
        heading("Impact", 2),
        paragraph(&summary.impact),
    ];

    if let Some(cause) = summary.cause.as_deref().filter(|c| !c.is_empty()) {
        content.push(heading("Cause", 2));
        content.push(paragraph(cause));
    }

    content.extend([
        heading("Actions", 2),
        bullet_list(&summary.actions),
        heading("Status", 2),
        paragraph(summary.status.label()),
        heading("Next steps", 2),
        bullet_list(&summary.next_steps),
        heading("QA notes", 2),
        heading("Cautions", 3),
        bullet_list(&summary.qa.cautions),
        heading("Related features", 3),
        bullet_list(&summary.qa.related_features),
    ]);

    json!({
        "version": 1,
        "type": "doc",
        "content": content
    })
}

/// Jira Cloud REST client (basic auth)
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: reqwest::Client,
    email: String,
    token: String,
}

impl JiraClient {
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            email: email.into(),
            token: token.into(),
        }
    }
}

/// Comment endpoint for an issue
pub fn comment_url(issue: &IssueRef) -> String {
    format!(
        "{}/rest/api/3/issue/{}/comment",
        issue.base_url, issue.issue_key
    )
}

#[async_trait]
impl IssueWriter for JiraClient {
    async fn add_comment(
        &self,
        issue: &IssueRef,
        summary: &SummaryDocument,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .post(comment_url(issue))
            .basic_auth(&self.email, Some(&self.token))
            .json(&json!({ "body": summary_to_adf(summary) }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Rejected {
                service: SERVICE.to_string(),
                status,
                body,
            });
        }

        Ok(())
    }
}
