//! Confluence page client

use async_trait::async_trait;
use serde_json::Value;

use super::html::strip_html;
use super::{ClientError, WikiPage, WikiSource};
use crate::urls::ConfluencePageRef;

const SERVICE: &str = "Confluence API";

/// Confluence REST client (basic auth)
///
/// Requests go to the configured base URL, not the one embedded in the
/// page link.
#[derive(Debug, Clone)]
pub struct ConfluenceClient {
    client: reqwest::Client,
    base_url: String,
    email: String,
    token: String,
}

impl ConfluenceClient {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            token: token.into(),
        }
    }

    fn content_url(&self, page_id: &str) -> String {
        format!(
            "{}/rest/api/content/{}?expand=body.storage",
            self.base_url, page_id
        )
    }
}

/// Map a content payload (`title`, `body.storage.value`) to a page
pub fn parse_content(payload: &Value) -> Result<WikiPage, ClientError> {
    let title = payload
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::invalid(SERVICE, "missing title"))?;

    let storage = payload
        .pointer("/body/storage/value")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::invalid(SERVICE, "missing body.storage.value"))?;

    Ok(WikiPage {
        title: title.to_string(),
        body: strip_html(storage),
    })
}

#[async_trait]
impl WikiSource for ConfluenceClient {
    async fn fetch_page(&self, page: &ConfluencePageRef) -> Result<WikiPage, ClientError> {
        let response = self
            .client
            .get(self.content_url(&page.page_id))
            .basic_auth(&self.email, Some(&self.token))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                service: SERVICE.to_string(),
                status: response.status().as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        parse_content(&payload)
    }
}
