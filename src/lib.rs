//! ticket-summarizer: engineering context in, validated Jira summary out
//!
//! Fetches chat threads, wiki pages and pull requests concurrently,
//! expands the change's impact radius through the local repository, and
//! asks a generative backend for a summary document that is validated
//! before anything is written to the issue tracker.

pub mod cli;
pub mod clients;
pub mod collectors;
pub mod config;
pub mod git_tools;
pub mod llm;
pub mod orchestrator;
pub mod urls;

// Re-export the pipeline surface
pub use config::{Config, ConfigError};
pub use llm::{Status, SummaryDocument};
pub use orchestrator::{Pipeline, PipelineError, RunOutcome, RunRequest, Sources};
pub use urls::UrlFormatError;
