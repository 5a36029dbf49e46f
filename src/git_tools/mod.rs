//! Git tools: repository search and file reads
//!
//! Thin wrappers over `git grep` and `git show` in the local working copy.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

/// Error type for git operations
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Git command failed: {0}")]
    CommandFailed(String),

    #[error("Not a git repository: {0}")]
    NotARepository(String),
}

/// List files whose contents match an extended regex
///
/// Searches tracked and untracked (but not ignored) files.
/// Returns paths relative to `repo_root`. No match is an empty list, not an error.
pub fn git_grep_files(repo_root: &Path, pattern: &str) -> Result<Vec<String>> {
    let output = Command::new("git")
        .arg("grep")
        .arg("-l")
        .arg("--untracked")
        .arg("-E")
        .arg(pattern)
        .current_dir(repo_root)
        .output()
        .context("Failed to execute git grep")?;

    if !output.status.success() {
        // Exit code 1 means no matches found
        if output.status.code() == Some(1) && output.stderr.is_empty() {
            return Ok(Vec::new());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("not a git repository") {
            return Err(GitError::NotARepository(repo_root.display().to_string()).into());
        }
        return Err(GitError::CommandFailed(stderr.to_string()).into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect())
}

/// Read a file as it exists at `rev` (e.g. `HEAD`)
pub fn git_show_file(repo_root: &Path, path: &str, rev: &str) -> Result<String> {
    let output = Command::new("git")
        .arg("show")
        .arg(format!("{}:{}", rev, path))
        .current_dir(repo_root)
        .output()
        .context("Failed to execute git show")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CommandFailed(stderr.to_string()).into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Check if path is in a git repository
pub fn is_git_repo(repo_root: &Path) -> bool {
    repo_root.join(".git").exists() || ancestors(repo_root).any(|p| p.join(".git").exists())
}

fn ancestors(path: &Path) -> impl Iterator<Item = &Path> {
    std::iter::successors(path.parent(), |p| p.parent())
}
