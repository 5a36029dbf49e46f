//! CLI argument parsing
//!
//! ```text
//! ticket-summarizer --jira <URL> [--slack <URL>]... [--confluence <URL>]...
//!                   [--github <URL>]... [--dry-run] [--config <PATH>]
//!                   [--log-level <FILTER>]
//! ```
//!
//! Unknown flags and a missing `--jira` are usage errors (exit code 2).

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::orchestrator::RunRequest;

/// Summarize Slack threads, Confluence pages and GitHub PRs into a Jira comment
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "ticket-summarizer", version)]
pub struct Args {
    /// Jira ticket URL (required)
    #[arg(long, value_name = "URL")]
    pub jira: String,

    /// Slack thread URL (repeatable)
    #[arg(long, value_name = "URL")]
    pub slack: Vec<String>,

    /// Confluence page URL (repeatable)
    #[arg(long, value_name = "URL")]
    pub confluence: Vec<String>,

    /// GitHub PR URL (repeatable)
    #[arg(long, value_name = "URL")]
    pub github: Vec<String>,

    /// Print the summary instead of writing it to Jira
    #[arg(long)]
    pub dry_run: bool,

    /// TOML configuration file (values may be written `env:NAME`)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The run these arguments ask for
    pub fn run_request(&self) -> RunRequest {
        RunRequest {
            jira: self.jira.clone(),
            slack: self.slack.clone(),
            confluence: self.confluence.clone(),
            github: self.github.clone(),
            dry_run: self.dry_run,
        }
    }
}

/// Parse arguments (first item is the program name)
pub fn parse_args<I, T>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args)
}
