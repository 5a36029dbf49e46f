//! CLI run dispatch
//!
//! Loads configuration, wires the real collaborators and runs the
//! pipeline on a tokio runtime. Source kinds without credentials are
//! left unwired; the pipeline reports them if they are requested.

use std::sync::Arc;

use crate::cli::{Args, Error, Result, EXIT_FAILURE, EXIT_SUCCESS};
use crate::clients::{
    ChatSource, ConfluenceClient, GitHubClient, JiraClient, PullRequestSource, SlackClient,
    WikiSource,
};
use crate::config::Config;
use crate::llm::adapters::{create_adapter_from_config, LlmAdapter};
use crate::orchestrator::{Pipeline, RunOutcome, Sources};

/// Exit code wrapper for CLI operations
pub type ExitCode = i32;

/// Run the summarizer and return the process exit code
///
/// Called from main() after argument parsing.
pub fn run_cli_mode(args: Args) -> ExitCode {
    match run(&args) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

fn run(args: &Args) -> Result<RunOutcome> {
    let config = Config::load(args.config.as_deref())?;
    let pipeline = build_pipeline(&config);

    let runtime = tokio::runtime::Runtime::new().map_err(Error::Runtime)?;
    let mut stdout = std::io::stdout();
    let outcome = runtime.block_on(pipeline.run(&args.run_request(), &mut stdout))?;
    Ok(outcome)
}

/// Source clients for every kind that has its credentials
pub fn build_sources(config: &Config) -> Sources {
    let chat = config
        .slack_credentials()
        .map(|token| Arc::new(SlackClient::new(token)) as Arc<dyn ChatSource>);

    let wiki = config.confluence_credentials().map(|(base_url, email, token)| {
        Arc::new(ConfluenceClient::new(base_url, email, token)) as Arc<dyn WikiSource>
    });

    let pull_requests = config
        .github_credentials()
        .map(|token| Arc::new(GitHubClient::new(token)) as Arc<dyn PullRequestSource>);

    Sources {
        chat,
        wiki,
        pull_requests,
    }
}

/// Full pipeline from configuration
pub fn build_pipeline(config: &Config) -> Pipeline {
    let writer = Arc::new(JiraClient::new(
        config.jira_email.clone(),
        config.jira_token.clone(),
    ));
    let adapter: Arc<dyn LlmAdapter> = Arc::new(create_adapter_from_config(config));

    Pipeline::new(
        build_sources(config),
        writer,
        adapter,
        config.local_repo_path.clone(),
    )
}
