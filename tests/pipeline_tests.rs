//! Pipeline integration tests
//!
//! Runs the full pipeline against in-memory collaborators and the stub
//! backend. Impact-analysis tests use throwaway git repositories.
//! No network access.

use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use ticket_summarizer::clients::{
    ChatMessage, ChatSource, ChatThread, ClientError, IssueWriter, PullRequest,
    PullRequestComment, PullRequestSource, WikiPage, WikiSource,
};
use ticket_summarizer::llm::adapters::StubAdapter;
use ticket_summarizer::llm::SummaryError;
use ticket_summarizer::urls::{ConfluencePageRef, IssueRef, PullRequestRef, SlackThreadRef};
use ticket_summarizer::{
    Pipeline, PipelineError, RunOutcome, RunRequest, Sources, Status, SummaryDocument,
};

const JIRA: &str = "https://team.atlassian.net/browse/PROJ-123";
const PR_URL: &str = "https://github.com/org/repo/pull/1";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeChat {
    calls: AtomicUsize,
}

#[async_trait]
impl ChatSource for FakeChat {
    async fn fetch_thread(&self, thread: &SlackThreadRef) -> Result<ChatThread, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ChatThread {
            messages: vec![ChatMessage {
                author: "U42".to_string(),
                text: format!("export fails in {}", thread.channel_id),
                timestamp: thread.thread_ts.clone(),
            }],
        })
    }
}

struct FakeWiki;

#[async_trait]
impl WikiSource for FakeWiki {
    async fn fetch_page(&self, page: &ConfluencePageRef) -> Result<WikiPage, ClientError> {
        Ok(WikiPage {
            title: format!("Page {}", page.page_id),
            body: "Export runbook".to_string(),
        })
    }
}

/// Serves one pull request per number; numbers >= 900 fail
struct FakePullRequests {
    changed_files: Vec<String>,
    calls: AtomicUsize,
}

impl FakePullRequests {
    fn new(changed_files: &[&str]) -> Self {
        Self {
            changed_files: changed_files.iter().map(|f| f.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PullRequestSource for FakePullRequests {
    async fn fetch_pull_request(&self, pr: &PullRequestRef) -> Result<PullRequest, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if pr.number >= 900 {
            return Err(ClientError::Status {
                service: "GitHub API".to_string(),
                status: 404,
            });
        }
        Ok(PullRequest {
            title: format!("Fix export #{}", pr.number),
            description: "Handles empty rows".to_string(),
            diff: "--- a/src/file.ts\n+++ b/src/file.ts\n+if (!rows.length) return;".to_string(),
            comments: vec![PullRequestComment {
                author: "reviewer".to_string(),
                body: "LGTM".to_string(),
            }],
            review_comments: vec![],
            changed_files: self.changed_files.clone(),
        })
    }
}

#[derive(Default)]
struct RecordingWriter {
    written: Mutex<Vec<(IssueRef, SummaryDocument)>>,
    fail: bool,
}

impl RecordingWriter {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(IssueRef, SummaryDocument)> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueWriter for RecordingWriter {
    async fn add_comment(
        &self,
        issue: &IssueRef,
        summary: &SummaryDocument,
    ) -> Result<(), ClientError> {
        self.written
            .lock()
            .unwrap()
            .push((issue.clone(), summary.clone()));
        if self.fail {
            return Err(ClientError::Rejected {
                service: "Jira API".to_string(),
                status: 403,
                body: "forbidden".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn summary_json(status: &str) -> String {
    format!(
        r#"```json
{{
  "title": "Export fixed for empty sheets",
  "background": "Exports crashed on empty sheets",
  "problem": "Empty row list was not handled",
  "impact": "CSV export",
  "cause": null,
  "actions": ["Added an empty-row guard"],
  "status": "{}",
  "nextSteps": ["Monitor export errors"],
  "qa": {{ "cautions": ["Try an empty sheet"], "relatedFeatures": ["PDF export"] }}
}}
```"#,
        status
    )
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Committed repository containing `files`
fn repo_with(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path();
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "user.name", "Test User"]);
    for (rel, contents) in files {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", "initial"]);
    temp
}

fn request(github: &[&str], dry_run: bool) -> RunRequest {
    RunRequest {
        jira: JIRA.to_string(),
        github: github.iter().map(|u| u.to_string()).collect(),
        dry_run,
        ..Default::default()
    }
}

fn pipeline(
    sources: Sources,
    writer: &Arc<RecordingWriter>,
    stub: &Arc<StubAdapter>,
    repo: &Path,
) -> Pipeline {
    Pipeline::new(sources, writer.clone(), stub.clone(), repo)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_end_to_end_single_pull_request_writes_once() {
    let repo = repo_with(&[("src/file.ts", "export const x = 1;\n")]);
    let prs = Arc::new(FakePullRequests::new(&["src/file.ts"]));
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::with_responses([
        "```json\n{\"additionalFiles\": []}\n```".to_string(),
        summary_json("resolved"),
    ]));
    let sources = Sources {
        pull_requests: Some(prs.clone()),
        ..Default::default()
    };

    let mut out = Vec::new();
    let outcome = pipeline(sources, &writer, &stub, repo.path())
        .run(&request(&[PR_URL], false), &mut out)
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Written(_)));
    assert_eq!(outcome.summary().status, Status::Resolved);

    let calls = writer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.issue_key, "PROJ-123");
    assert_eq!(calls[0].0.base_url, "https://team.atlassian.net");
    assert_eq!(&calls[0].1, outcome.summary());

    assert_eq!(stub.call_count(), 2);
    assert_eq!(prs.calls.load(Ordering::SeqCst), 1);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Done! Summary written to PROJ-123"));
    assert!(printed.contains("Status: resolved"));
}

#[tokio::test]
async fn test_no_sources_reaches_synthesis_with_empty_sections() {
    let repo = TempDir::new().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::with_response(summary_json("investigating")));

    let mut out = Vec::new();
    let outcome = pipeline(Sources::default(), &writer, &stub, repo.path())
        .run(&request(&[], true), &mut out)
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Printed(_)));

    // Impact analysis is skipped without a pull request: one backend call
    let prompts = stub.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(!prompts[0].contains("## Slack thread"));
    assert!(!prompts[0].contains("## Confluence pages"));
    assert!(!prompts[0].contains("## Pull Request"));
    assert!(!prompts[0].contains("## Code in the impact radius"));
}

#[tokio::test]
async fn test_dry_run_never_writes() {
    let repo = repo_with(&[("src/file.ts", "export const x = 1;\n")]);
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::with_responses([
        "no files to add".to_string(),
        summary_json("monitoring"),
    ]));
    let sources = Sources {
        pull_requests: Some(Arc::new(FakePullRequests::new(&["src/file.ts"]))),
        ..Default::default()
    };

    let mut out = Vec::new();
    let outcome = pipeline(sources, &writer, &stub, repo.path())
        .run(&request(&[PR_URL], true), &mut out)
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Printed(_)));
    assert!(writer.calls().is_empty());

    let printed = String::from_utf8(out).unwrap();
    let rule = "=".repeat(50);
    assert!(printed.contains(&rule));
    assert!(printed.contains("[dry-run] PROJ-123 summary (not written)"));
    assert!(printed.contains("\"nextSteps\""));
    assert!(printed.contains("\"status\": \"monitoring\""));
}

#[tokio::test]
async fn test_all_source_kinds_feed_the_summary_prompt() {
    let repo = repo_with(&[("src/file.ts", "export const x = 1;\n")]);
    let chat = Arc::new(FakeChat::default());
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::with_responses([
        "{\"additionalFiles\": []}".to_string(),
        summary_json("in_progress"),
    ]));
    let sources = Sources {
        chat: Some(chat.clone()),
        wiki: Some(Arc::new(FakeWiki)),
        pull_requests: Some(Arc::new(FakePullRequests::new(&["src/file.ts"]))),
    };
    let run = RunRequest {
        jira: JIRA.to_string(),
        slack: vec![
            "https://team.slack.com/archives/C111/p1700000000000100".to_string(),
            "https://team.slack.com/archives/C222/p1700000000000200".to_string(),
        ],
        confluence: vec!["https://team.atlassian.net/wiki/spaces/ENG/pages/77/Runbook".to_string()],
        github: vec![PR_URL.to_string()],
        dry_run: false,
    };

    let mut out = Vec::new();
    pipeline(sources, &writer, &stub, repo.path())
        .run(&run, &mut out)
        .await
        .unwrap();

    assert_eq!(chat.calls.load(Ordering::SeqCst), 2);

    let prompts = stub.prompts();
    let summary_prompt = &prompts[1];
    assert!(summary_prompt.contains("U42: export fails in C111\nU42: export fails in C222"));
    assert!(summary_prompt.contains("# Page 77\nExport runbook"));
    assert!(summary_prompt.contains("## Pull Request: Fix export #1"));
    assert!(summary_prompt.contains("reviewer: LGTM"));
    assert_eq!(writer.calls().len(), 1);
}

#[tokio::test]
async fn test_failed_url_is_tolerated() {
    let repo = repo_with(&[("src/file.ts", "export const x = 1;\n")]);
    let prs = Arc::new(FakePullRequests::new(&["src/file.ts"]));
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::with_responses([
        "{\"additionalFiles\": []}".to_string(),
        summary_json("resolved"),
    ]));
    let sources = Sources {
        pull_requests: Some(prs.clone()),
        ..Default::default()
    };

    let mut out = Vec::new();
    let outcome = pipeline(sources, &writer, &stub, repo.path())
        .run(
            &request(&[PR_URL, "https://github.com/org/repo/pull/999"], false),
            &mut out,
        )
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Written(_)));
    assert_eq!(prs.calls.load(Ordering::SeqCst), 2);

    let prompts = stub.prompts();
    assert!(prompts[1].contains("## Pull Request: Fix export #1\n"));
    assert!(!prompts[1].contains("#999"));
}

#[tokio::test]
async fn test_all_pull_requests_failing_skips_impact_analysis() {
    let repo = TempDir::new().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::with_response(summary_json("investigating")));
    let sources = Sources {
        pull_requests: Some(Arc::new(FakePullRequests::new(&["src/file.ts"]))),
        ..Default::default()
    };

    let mut out = Vec::new();
    pipeline(sources, &writer, &stub, repo.path())
        .run(&request(&["https://github.com/org/repo/pull/901"], true), &mut out)
        .await
        .unwrap();

    assert_eq!(stub.call_count(), 1);
    assert!(!stub.prompts()[0].contains("## Pull Request"));
}

#[tokio::test]
async fn test_missing_credential_fails_before_any_fetch() {
    let repo = TempDir::new().unwrap();
    let prs = Arc::new(FakePullRequests::new(&["src/file.ts"]));
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::new());
    let sources = Sources {
        pull_requests: Some(prs.clone()),
        ..Default::default()
    };
    let run = RunRequest {
        slack: vec!["https://team.slack.com/archives/C111/p1700000000000100".to_string()],
        ..request(&[PR_URL], false)
    };

    let mut out = Vec::new();
    let err = pipeline(sources, &writer, &stub, repo.path())
        .run(&run, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Configuration(_)));
    assert!(err.to_string().contains("SLACK_TOKEN"));
    assert_eq!(prs.calls.load(Ordering::SeqCst), 0);
    assert_eq!(stub.call_count(), 0);
    assert!(writer.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_url_is_fatal() {
    let repo = TempDir::new().unwrap();
    let prs = Arc::new(FakePullRequests::new(&[]));
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::new());
    let sources = Sources {
        pull_requests: Some(prs.clone()),
        ..Default::default()
    };

    let mut out = Vec::new();
    let err = pipeline(sources, &writer, &stub, repo.path())
        .run(&request(&["https://github.com/org/repo/issues/5"], false), &mut out)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid GitHub PR URL: https://github.com/org/repo/issues/5"
    );
    assert_eq!(prs.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_issue_url_is_fatal() {
    let repo = TempDir::new().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::new());

    let run = RunRequest {
        jira: "https://team.atlassian.net/projects/PROJ".to_string(),
        ..Default::default()
    };

    let mut out = Vec::new();
    let err = pipeline(Sources::default(), &writer, &stub, repo.path())
        .run(&run, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::UrlFormat(_)));
}

#[tokio::test]
async fn test_summary_without_json_is_fatal_and_nothing_is_written() {
    let repo = TempDir::new().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::with_response("I could not summarize this."));

    let mut out = Vec::new();
    let err = pipeline(Sources::default(), &writer, &stub, repo.path())
        .run(&request(&[], false), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Synthesis(SummaryError::NoJson)));
    assert!(writer.calls().is_empty());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_invalid_summary_is_fatal_even_in_dry_run() {
    let repo = TempDir::new().unwrap();
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::with_response(summary_json("done")));

    let mut out = Vec::new();
    let err = pipeline(Sources::default(), &writer, &stub, repo.path())
        .run(&request(&[], true), &mut out)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("status must be one of"));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_stage_one_failure_does_not_abort() {
    let repo = repo_with(&[("src/file.ts", "export const x = 1;\n")]);
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::new());
    stub.push_failure("model overloaded");
    stub.push_response(summary_json("resolved"));
    let sources = Sources {
        pull_requests: Some(Arc::new(FakePullRequests::new(&["src/file.ts"]))),
        ..Default::default()
    };

    let mut out = Vec::new();
    let outcome = pipeline(sources, &writer, &stub, repo.path())
        .run(&request(&[PR_URL], false), &mut out)
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Written(_)));
    assert_eq!(writer.calls().len(), 1);
}

#[tokio::test]
async fn test_write_failure_is_fatal() {
    let repo = TempDir::new().unwrap();
    let writer = Arc::new(RecordingWriter::failing());
    let stub = Arc::new(StubAdapter::with_response(summary_json("resolved")));

    let mut out = Vec::new();
    let err = pipeline(Sources::default(), &writer, &stub, repo.path())
        .run(&request(&[], false), &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Write { .. }));
    assert!(err.to_string().contains("PROJ-123"));
    assert!(err.to_string().contains("403"));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_importers_and_recommended_files_reach_the_prompts() {
    let repo = repo_with(&[
        (
            "src/utils/helper.ts",
            "export function helper() { return 1; }\n",
        ),
        (
            "src/index.ts",
            "import { helper } from './utils/helper';\nhelper();\n",
        ),
        ("src/extra.ts", "export const EXTRA = true;\n"),
    ]);
    let writer = Arc::new(RecordingWriter::default());
    let stub = Arc::new(StubAdapter::with_responses([
        "```json\n{\"additionalFiles\": [\"src/extra.ts\", \"src/missing.ts\", \"src/index.ts\"]}\n```"
            .to_string(),
        summary_json("resolved"),
    ]));
    let sources = Sources {
        pull_requests: Some(Arc::new(FakePullRequests::new(&["src/utils/helper.ts"]))),
        ..Default::default()
    };

    let mut out = Vec::new();
    pipeline(sources, &writer, &stub, repo.path())
        .run(&request(&[PR_URL], true), &mut out)
        .await
        .unwrap();

    let prompts = stub.prompts();

    // Stage 1 sees the importer and its content
    assert!(prompts[0].contains("- src/index.ts"));
    assert!(prompts[0].contains("import { helper } from './utils/helper';"));
    assert!(prompts[0].contains("- src/utils/helper.ts"));

    // Stage 2 gets only the readable, not-yet-supplied recommendations
    assert!(prompts[1].contains("## Code in the impact radius"));
    assert!(prompts[1].contains("### src/extra.ts\n```\nexport const EXTRA = true;\n"));
    assert!(!prompts[1].contains("### src/missing.ts"));
    assert!(!prompts[1].contains("### src/index.ts"));
}
