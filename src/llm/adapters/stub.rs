//! Stub Adapter
//!
//! Deterministic adapter that replays scripted responses without spawning
//! anything. Used by pipeline tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::llm::adapters::{AdapterError, LlmAdapter};

/// One scripted reply
#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Fail(String),
}

/// Stub adapter for testing (replays responses in order)
#[derive(Debug, Default)]
pub struct StubAdapter {
    responses: Mutex<VecDeque<Scripted>>,
    /// Every prompt received, in call order
    prompts: Mutex<Vec<String>>,
}

impl StubAdapter {
    /// Create stub with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Create stub that answers the first call with `response`
    pub fn with_response(response: impl Into<String>) -> Self {
        Self::with_responses([response.into()])
    }

    /// Create stub that answers calls with `responses`, in order
    pub fn with_responses<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let stub = Self::new();
        for response in responses {
            stub.push_response(response);
        }
        stub
    }

    /// Queue a successful response
    pub fn push_response(&self, response: impl Into<String>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Scripted::Text(response.into()));
        }
    }

    /// Queue a failing call (reported as a non-zero engine exit)
    pub fn push_failure(&self, stderr: impl Into<String>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Scripted::Fail(stderr.into()));
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmAdapter for StubAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, AdapterError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());

        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Fail(stderr)) => Err(AdapterError::NonZeroExit {
                program: "stub".to_string(),
                code: "1".to_string(),
                stderr,
            }),
            None => Err(AdapterError::Exhausted),
        }
    }

    fn provider_name(&self) -> &str {
        "stub"
    }
}
