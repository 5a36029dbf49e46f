//! CLI module
//!
//! Provides:
//! - Argument parsing (clap derive)
//! - Collaborator wiring from configuration
//! - Run dispatch and exit-code mapping

pub mod args;
pub mod dispatch;

// Re-exports
pub use args::{parse_args, Args};
pub use dispatch::{run_cli_mode, ExitCode};

use crate::config::ConfigError;
use crate::orchestrator::PipelineError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;
