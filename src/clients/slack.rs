//! Slack thread client
//!
//! Reads one thread through `conversations.replies`.

use async_trait::async_trait;
use serde_json::Value;

use super::{ChatMessage, ChatSource, ChatThread, ClientError};
use crate::urls::SlackThreadRef;

const SERVICE: &str = "Slack API";

/// Default Web API root
pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Slack Web API client (bearer token)
#[derive(Debug, Clone)]
pub struct SlackClient {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base(token, SLACK_API_BASE)
    }

    /// Client against a different API root
    pub fn with_base(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            api_base: api_base.into(),
        }
    }
}

/// Map a `conversations.replies` payload to a thread
///
/// `ok: false` is reported with the payload's `error` field. Missing
/// authors become `unknown`, missing text becomes empty.
pub fn parse_replies(payload: &Value) -> Result<ChatThread, ClientError> {
    if !payload.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        let message = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error")
            .to_string();
        return Err(ClientError::Api {
            service: SERVICE.to_string(),
            message,
        });
    }

    let raw = payload
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::invalid(SERVICE, "missing messages array"))?;

    let messages = raw
        .iter()
        .map(|m| ChatMessage {
            author: m
                .get("user")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            text: m
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            timestamp: m
                .get("ts")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
        .collect();

    Ok(ChatThread { messages })
}

#[async_trait]
impl ChatSource for SlackClient {
    async fn fetch_thread(&self, thread: &SlackThreadRef) -> Result<ChatThread, ClientError> {
        let response = self
            .client
            .get(format!("{}/conversations.replies", self.api_base))
            .query(&[
                ("channel", thread.channel_id.as_str()),
                ("ts", thread.thread_ts.as_str()),
            ])
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status {
                service: SERVICE.to_string(),
                status: response.status().as_u16(),
            });
        }

        let payload: Value = response.json().await?;
        parse_replies(&payload)
    }
}
