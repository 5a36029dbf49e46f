//! Prompt templates for the two generation stages

use std::collections::BTreeMap;

use crate::llm::types::PullRequestContext;

/// Render `path` + body as a fenced file section
pub fn file_section(path: &str, content: &str) -> String {
    format!("### {}\n```\n{}\n```", path, content)
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stage 1 prompt: ask for files affected by the change that are not yet in view
pub fn build_impact_analysis_prompt(
    diff: &str,
    changed_files: &[String],
    importers: &[String],
    importer_contents: &BTreeMap<String, String>,
) -> String {
    let importer_section = importer_contents
        .iter()
        .map(|(path, content)| file_section(path, content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a senior software engineer. Analyze the blast radius of the code change below.

## Diff
```diff
{diff}
```

## Changed files
{changed}

## Files that import the changed files
{importers}

## Contents of the importing files
{importer_section}

## Task
List the paths of files that may be affected by this change but have not been examined yet.
Exclude every file already listed above.

Answer in this JSON format:
```json
{{
  "additionalFiles": ["path/to/file1.ts", "path/to/file2.ts"]
}}
```

If there is nothing else to examine, return an empty array."#,
        diff = diff,
        changed = bullet_list(changed_files),
        importers = bullet_list(importers),
        importer_section = importer_section,
    )
}

/// Stage 2 prompt: ask for the summary document
///
/// Sections appear in the order chat, wiki, pull request, impact context;
/// absent or empty inputs produce no section at all.
pub fn build_summary_prompt(
    chat: Option<&str>,
    wiki: Option<&str>,
    pull_request: Option<&PullRequestContext>,
    impact_context: &str,
) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(chat) = chat.filter(|c| !c.is_empty()) {
        sections.push(format!("## Slack thread\n{}", chat));
    }

    if let Some(wiki) = wiki.filter(|w| !w.is_empty()) {
        sections.push(format!("## Confluence pages\n{}", wiki));
    }

    if let Some(pr) = pull_request {
        let comments = pr
            .comments
            .iter()
            .map(|c| format!("{}: {}", c.author, c.body))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!(
            "## Pull Request: {}\n### Description\n{}\n### Diff\n```diff\n{}\n```\n### Comments\n{}",
            pr.title, pr.description, pr.diff, comments
        ));
    }

    if !impact_context.is_empty() {
        sections.push(format!("## Code in the impact radius\n{}", impact_context));
    }

    format!(
        r#"You are a senior software engineer who can explain technical changes so that non-engineers understand them.

Write a summary for the Jira ticket based on the information below.

{sections}

## Style
- Write in plain, direct declarative sentences ("The cache was cleared.", "The endpoint now retries."). No hedging, no pleasantries.
- Keep it short and easy to follow.

## Output format
Output exactly this JSON shape.

```json
{{
  "title": "Short title of the change",
  "background": "Why this change was needed",
  "problem": "The problem being solved",
  "impact": "What this change affects",
  "cause": "Root cause of the problem (for bug fixes) or null",
  "actions": ["Action taken 1", "Action taken 2"],
  "status": "investigating | in_progress | resolved | monitoring",
  "nextSteps": ["Next step 1", "Next step 2"],
  "qa": {{
    "cautions": ["What QA should watch for 1"],
    "relatedFeatures": ["Related feature 1"]
  }}
}}
```"#,
        sections = sections.join("\n\n"),
    )
}
