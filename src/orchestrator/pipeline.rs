//! The summarization run
//!
//! Phases run strictly in order: credential check, URL parsing, fetch,
//! impact analysis, synthesis, then print or write. Only the fetch phase
//! runs anything concurrently.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::aggregate::AggregatedContext;
use super::fetch::{fetch_all, FetchTargets, Sources};
use super::PipelineError;
use crate::clients::IssueWriter;
use crate::collectors::find_importers;
use crate::git_tools::{git_show_file, is_git_repo};
use crate::llm::adapters::LlmAdapter;
use crate::llm::prompts::file_section;
use crate::llm::{analyze_impact, generate_summary, SummaryDocument};
use crate::urls::{
    parse_confluence_url, parse_github_pr_url, parse_jira_url, parse_slack_url, IssueRef,
};

const RULE_WIDTH: usize = 50;

/// One run's inputs, as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub jira: String,
    pub slack: Vec<String>,
    pub confluence: Vec<String>,
    pub github: Vec<String>,
    pub dry_run: bool,
}

/// Which terminal branch a successful run took
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Dry run: document printed, nothing written
    Printed(SummaryDocument),
    /// Document written to the issue tracker
    Written(SummaryDocument),
}

impl RunOutcome {
    pub fn summary(&self) -> &SummaryDocument {
        match self {
            RunOutcome::Printed(doc) | RunOutcome::Written(doc) => doc,
        }
    }
}

/// Pipeline wiring: collaborators, backend and local repository
pub struct Pipeline {
    sources: Sources,
    writer: Arc<dyn IssueWriter>,
    adapter: Arc<dyn LlmAdapter>,
    repo_path: PathBuf,
}

impl Pipeline {
    pub fn new(
        sources: Sources,
        writer: Arc<dyn IssueWriter>,
        adapter: Arc<dyn LlmAdapter>,
        repo_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sources,
            writer,
            adapter,
            repo_path: repo_path.into(),
        }
    }

    /// Execute one run; the dry-run document and completion banner go to `out`
    pub async fn run(
        &self,
        request: &RunRequest,
        out: &mut (dyn Write + Send),
    ) -> Result<RunOutcome, PipelineError> {
        self.check_credentials(request)?;

        let issue = parse_jira_url(&request.jira)?;
        info!("Generating summary for Jira ticket {}", issue.issue_key);

        let targets = parse_targets(request)?;

        // [1/4] fetch
        info!("[1/4] Fetching sources: {}", describe_targets(&targets));
        let results = fetch_all(&self.sources, &targets).await;
        let context = AggregatedContext::from_results(results);

        // [2/4] impact
        let impact_context = if context.pull_requests.is_empty() {
            info!("[2/4] Impact analysis: skipped (no GitHub PR)");
            String::new()
        } else {
            info!("[2/4] Impact analysis: collecting importers");
            self.impact_context(&context).await
        };

        // [3/4] synthesis
        info!("[3/4] Generating summary with {}", self.adapter.provider_name());
        let chat = context.chat_text();
        let wiki = context.wiki_text();
        let pull_request = context.merged_pull_request();
        let summary = generate_summary(
            self.adapter.as_ref(),
            chat.as_deref(),
            wiki.as_deref(),
            pull_request.as_ref(),
            &impact_context,
        )
        .await?;
        info!("  OK summary ready: {}", summary.title);

        // [4/4] output
        if request.dry_run {
            info!("[4/4] dry-run: skipping Jira write");
            print_dry_run(out, &issue, &summary)?;
            return Ok(RunOutcome::Printed(summary));
        }

        info!("[4/4] Writing to Jira: adding comment to {}", issue.issue_key);
        self.writer
            .add_comment(&issue, &summary)
            .await
            .map_err(|source| PipelineError::Write {
                issue: issue.issue_key.clone(),
                source,
            })?;
        print_completion(out, &issue, &summary)?;

        Ok(RunOutcome::Written(summary))
    }

    fn check_credentials(&self, request: &RunRequest) -> Result<(), PipelineError> {
        if !request.slack.is_empty() && self.sources.chat.is_none() {
            return Err(PipelineError::Configuration(
                "--slack requires SLACK_TOKEN to be set".to_string(),
            ));
        }
        if !request.confluence.is_empty() && self.sources.wiki.is_none() {
            return Err(PipelineError::Configuration(
                "--confluence requires CONFLUENCE_TOKEN, CONFLUENCE_BASE_URL and CONFLUENCE_EMAIL to be set"
                    .to_string(),
            ));
        }
        if !request.github.is_empty() && self.sources.pull_requests.is_none() {
            return Err(PipelineError::Configuration(
                "--github requires GITHUB_TOKEN to be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Reverse-dependency search, stage 1, and reading the recommended files
    async fn impact_context(&self, context: &AggregatedContext) -> String {
        let changed_files = context.changed_files();
        let diff = context.combined_diff();

        if !is_git_repo(&self.repo_path) {
            warn!(
                "{} is not a git repository; no importers will be found",
                self.repo_path.display()
            );
        }

        let repo = self.repo_path.clone();
        let files = changed_files.clone();
        let collected = tokio::task::spawn_blocking(move || {
            let importers: Vec<String> = find_importers(&repo, &files).into_iter().collect();
            let contents: BTreeMap<String, String> =
                read_files(&repo, &importers).into_iter().collect();
            (importers, contents)
        })
        .await;
        let (importers, importer_contents) = collected.unwrap_or_else(|e| {
            warn!("importer search did not complete: {}", e);
            (Vec::new(), BTreeMap::new())
        });
        info!("  OK {} importing files found", importers.len());

        info!("  AI analyzing impact with {}", self.adapter.provider_name());
        let analysis = analyze_impact(
            self.adapter.as_ref(),
            &diff,
            &changed_files,
            &importers,
            &importer_contents,
        )
        .await;
        info!(
            "  OK {} additional files to review",
            analysis.additional_files.len()
        );

        let repo = self.repo_path.clone();
        let additional = tokio::task::spawn_blocking(move || {
            read_files(&repo, &analysis.additional_files)
        })
        .await
        .unwrap_or_else(|e| {
            warn!("reading additional files did not complete: {}", e);
            Vec::new()
        });

        additional
            .iter()
            .map(|(path, content)| file_section(path, content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Parse every source URL up front; a malformed one aborts the run
fn parse_targets(request: &RunRequest) -> Result<FetchTargets, PipelineError> {
    let mut targets = FetchTargets::default();
    for url in &request.slack {
        targets.chat.push((url.clone(), parse_slack_url(url)?));
    }
    for url in &request.confluence {
        targets.wiki.push((url.clone(), parse_confluence_url(url)?));
    }
    for url in &request.github {
        targets
            .pull_requests
            .push((url.clone(), parse_github_pr_url(url)?));
    }
    Ok(targets)
}

fn describe_targets(targets: &FetchTargets) -> String {
    if targets.is_empty() {
        return "no sources given".to_string();
    }
    let mut parts = Vec::new();
    if !targets.chat.is_empty() {
        parts.push(format!("Slack ({})", targets.chat.len()));
    }
    if !targets.wiki.is_empty() {
        parts.push(format!("Confluence ({})", targets.wiki.len()));
    }
    if !targets.pull_requests.is_empty() {
        parts.push(format!("GitHub PR ({})", targets.pull_requests.len()));
    }
    parts.join(", ")
}

/// Read `paths` at HEAD, skipping any that cannot be read
fn read_files(repo: &Path, paths: &[String]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| match git_show_file(repo, path, "HEAD") {
            Ok(content) => Some((path.clone(), content)),
            Err(e) => {
                debug!("skipping {}: {}", path, e);
                None
            }
        })
        .collect()
}

fn print_dry_run(
    out: &mut (dyn Write + Send),
    issue: &IssueRef,
    summary: &SummaryDocument,
) -> Result<(), PipelineError> {
    let rule = "=".repeat(RULE_WIDTH);
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| PipelineError::Output(std::io::Error::other(e)))?;
    writeln!(out, "\n{}", rule)?;
    writeln!(out, "[dry-run] {} summary (not written)", issue.issue_key)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", json)?;
    writeln!(out, "{}\n", rule)?;
    Ok(())
}

fn print_completion(
    out: &mut (dyn Write + Send),
    issue: &IssueRef,
    summary: &SummaryDocument,
) -> Result<(), PipelineError> {
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "\n{}", rule)?;
    writeln!(out, "Done! Summary written to {}", issue.issue_key)?;
    writeln!(out, "Title: {}", summary.title)?;
    writeln!(out, "Status: {}", summary.status)?;
    writeln!(out, "{}\n", rule)?;
    Ok(())
}
