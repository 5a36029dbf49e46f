//! Aggregation of settled fetch results into synthesis input

use std::collections::HashSet;
use tracing::{info, warn};

use super::fetch::{FetchResults, SourceResult};
use crate::clients::{ChatMessage, PullRequest, WikiPage};
use crate::llm::types::{CommentEntry, PullRequestContext};

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Successful results of one run, merged per kind in result order
#[derive(Debug, Clone, Default)]
pub struct AggregatedContext {
    pub chat_messages: Vec<ChatMessage>,
    pub wiki_pages: Vec<WikiPage>,
    pub pull_requests: Vec<PullRequest>,
    /// Number of URLs that failed to fetch
    pub failures: usize,
}

impl AggregatedContext {
    /// Merge the fan-out results, logging every failed URL
    pub fn from_results(results: FetchResults) -> Self {
        let mut context = AggregatedContext::default();

        for result in results.chat {
            match result {
                SourceResult::Ok { value, .. } => {
                    info!("  OK Slack: {} messages", value.messages.len());
                    context.chat_messages.extend(value.messages);
                }
                SourceResult::Err { error, origin } => {
                    warn!("  NG failed to fetch Slack thread ({}): {}", origin, error);
                    context.failures += 1;
                }
            }
        }

        for result in results.wiki {
            match result {
                SourceResult::Ok { value, .. } => {
                    info!("  OK Confluence: {}", value.title);
                    context.wiki_pages.push(value);
                }
                SourceResult::Err { error, origin } => {
                    warn!("  NG failed to fetch Confluence page ({}): {}", origin, error);
                    context.failures += 1;
                }
            }
        }

        for result in results.pull_requests {
            match result {
                SourceResult::Ok { value, .. } => {
                    info!(
                        "  OK GitHub PR: {} ({} files changed)",
                        value.title,
                        value.changed_files.len()
                    );
                    context.pull_requests.push(value);
                }
                SourceResult::Err { error, origin } => {
                    warn!("  NG failed to fetch GitHub PR ({}): {}", origin, error);
                    context.failures += 1;
                }
            }
        }

        context
    }

    /// `author: text` lines, or `None` without messages
    pub fn chat_text(&self) -> Option<String> {
        if self.chat_messages.is_empty() {
            return None;
        }
        Some(
            self.chat_messages
                .iter()
                .map(|m| format!("{}: {}", m.author, m.text))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// `# title` + body per page, or `None` without pages
    pub fn wiki_text(&self) -> Option<String> {
        if self.wiki_pages.is_empty() {
            return None;
        }
        Some(
            self.wiki_pages
                .iter()
                .map(|p| format!("# {}\n{}", p.title, p.body))
                .collect::<Vec<_>>()
                .join(SECTION_SEPARATOR),
        )
    }

    /// All pull requests folded into one context
    ///
    /// General comments come first, then review comments tagged with
    /// their file path.
    pub fn merged_pull_request(&self) -> Option<PullRequestContext> {
        if self.pull_requests.is_empty() {
            return None;
        }

        let prs = &self.pull_requests;
        let general = prs.iter().flat_map(|pr| &pr.comments).map(|c| CommentEntry {
            author: c.author.clone(),
            body: c.body.clone(),
        });
        let review = prs
            .iter()
            .flat_map(|pr| &pr.review_comments)
            .map(|rc| CommentEntry {
                author: rc.author.clone(),
                body: format!("[{}] {}", rc.path, rc.body),
            });

        Some(PullRequestContext {
            title: prs
                .iter()
                .map(|pr| pr.title.as_str())
                .collect::<Vec<_>>()
                .join(" / "),
            description: prs
                .iter()
                .map(|pr| pr.description.as_str())
                .collect::<Vec<_>>()
                .join(SECTION_SEPARATOR),
            diff: self.combined_diff(),
            comments: general.chain(review).collect(),
        })
    }

    /// Changed files across all pull requests, first occurrence wins
    pub fn changed_files(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.pull_requests
            .iter()
            .flat_map(|pr| &pr.changed_files)
            .filter(|file| seen.insert(*file))
            .cloned()
            .collect()
    }

    pub fn combined_diff(&self) -> String {
        self.pull_requests
            .iter()
            .map(|pr| pr.diff.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
