//! LLM integration: two generation stages over one adapter layer
//!
//! - `analyze_impact()` → ImpactAnalysis (advisory, never fails)
//! - `generate_summary()` → SummaryDocument (strict, validated before use)
//!
//! Both stages share the prompt templates and the JSON extraction grammar.

pub mod adapters;
pub mod extract;
pub mod impact;
pub mod prompts;
pub mod summarizer;
pub mod types;

// Re-export main types
pub use types::{
    CommentEntry, ImpactAnalysis, PullRequestContext, QaNotes, Status, SummaryDocument,
};

// Re-export stage entrypoints
pub use impact::{analyze_impact, parse_impact_response};
pub use summarizer::{
    generate_summary, parse_summary_response, validate_summary, SummaryError, ValidationError,
};

// Re-export adapters
pub use adapters::{create_adapter_from_config, Adapter, AdapterError, LlmAdapter};
