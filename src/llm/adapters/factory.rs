//! Adapter Factory
//!
//! Creates the backend adapter from run configuration. The model option is
//! carried by the adapter value itself; nothing is stored process-wide.

use crate::config::Config;
use crate::llm::adapters::{Adapter, ClaudeCliAdapter};

/// Create adapter from resolved configuration
pub fn create_adapter_from_config(config: &Config) -> Adapter {
    Adapter::ClaudeCli(ClaudeCliAdapter::new(
        config.claude_command.clone(),
        config.claude_model.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::adapters::LlmAdapter;

    fn config_with(model: Option<&str>) -> Config {
        Config::from_vars(|key| match key {
            "JIRA_TOKEN" => Some("t".to_string()),
            "JIRA_EMAIL" => Some("e@example.com".to_string()),
            "LOCAL_REPO_PATH" => Some(".".to_string()),
            "CLAUDE_MODEL" => model.map(|m| m.to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_factory_threads_model() {
        match create_adapter_from_config(&config_with(Some("opus"))) {
            Adapter::ClaudeCli(a) => {
                assert_eq!(a.model(), Some("opus"));
                assert_eq!(a.provider_name(), "claude-cli");
            }
            other => panic!("unexpected adapter: {:?}", other),
        }
    }

    #[test]
    fn test_factory_default_model() {
        match create_adapter_from_config(&config_with(None)) {
            Adapter::ClaudeCli(a) => assert!(a.model().is_none()),
            other => panic!("unexpected adapter: {:?}", other),
        }
    }
}
