//! Generative backend adapters
//!
//! Text-in/text-out interface over the generation engine. Adapters know
//! nothing about the JSON contracts the stages expect.

pub mod claude_cli;
pub mod factory;
pub mod stub;

pub use claude_cli::ClaudeCliAdapter;
pub use factory::create_adapter_from_config;
pub use stub::StubAdapter;

use async_trait::async_trait;

/// Adapter errors
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Engine executable could not be started
    #[error("Failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    /// Engine ran but exited unsuccessfully
    #[error("{program} -p exited with an error (code {code}): {stderr}")]
    NonZeroExit {
        program: String,
        code: String,
        stderr: String,
    },

    /// IO error while talking to the engine
    #[error("IO error: {0}")]
    Io(String),

    /// Stub adapter has no scripted response left
    #[error("No scripted response left")]
    Exhausted,
}

impl From<std::io::Error> for AdapterError {
    fn from(err: std::io::Error) -> Self {
        AdapterError::Io(err.to_string())
    }
}

/// LLM adapter trait
///
/// Both pipeline stages call the backend through this interface.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Generate a completion for `prompt`, returning the raw output text
    async fn generate(&self, prompt: &str) -> Result<String, AdapterError>;

    /// Provider name for logging
    fn provider_name(&self) -> &str;
}

/// Adapter enum (concrete type for all backends)
#[derive(Debug)]
pub enum Adapter {
    ClaudeCli(ClaudeCliAdapter),
    Stub(StubAdapter),
}

#[async_trait]
impl LlmAdapter for Adapter {
    async fn generate(&self, prompt: &str) -> Result<String, AdapterError> {
        match self {
            Adapter::ClaudeCli(a) => a.generate(prompt).await,
            Adapter::Stub(a) => a.generate(prompt).await,
        }
    }

    fn provider_name(&self) -> &str {
        match self {
            Adapter::ClaudeCli(a) => a.provider_name(),
            Adapter::Stub(a) => a.provider_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_error_display() {
        let err = AdapterError::Spawn {
            program: "claude".to_string(),
            message: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to run claude: No such file or directory"
        );

        let err = AdapterError::NonZeroExit {
            program: "claude".to_string(),
            code: "2".to_string(),
            stderr: "bad flag".to_string(),
        };
        assert!(err.to_string().contains("code 2"));
        assert!(err.to_string().contains("bad flag"));
    }

    #[tokio::test]
    async fn test_adapter_enum_delegates() {
        let adapter = Adapter::Stub(StubAdapter::with_response("hello"));
        assert_eq!(adapter.provider_name(), "stub");
        assert_eq!(adapter.generate("prompt").await.unwrap(), "hello");
    }
}
