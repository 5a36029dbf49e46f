//! Types shared by the generation stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticket status reported by the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Investigating,
    InProgress,
    Resolved,
    Monitoring,
}

impl Status {
    /// Every accepted literal, in contract order
    pub const ALL: [Status; 4] = [
        Status::Investigating,
        Status::InProgress,
        Status::Resolved,
        Status::Monitoring,
    ];

    /// Wire literal
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Investigating => "investigating",
            Status::InProgress => "in_progress",
            Status::Resolved => "resolved",
            Status::Monitoring => "monitoring",
        }
    }

    /// Parse wire literal (exact match only)
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Human-readable label for rendered documents
    pub fn label(&self) -> &'static str {
        match self {
            Status::Investigating => "Investigating",
            Status::InProgress => "In progress",
            Status::Resolved => "Resolved",
            Status::Monitoring => "Monitoring",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// QA section of the summary
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaNotes {
    pub cautions: Vec<String>,
    pub related_features: Vec<String>,
}

/// Validated summary document written to the issue tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDocument {
    pub title: String,
    pub background: String,
    pub problem: String,
    pub impact: String,
    /// Root cause; `None` when not applicable
    pub cause: Option<String>,
    pub actions: Vec<String>,
    pub status: Status,
    pub next_steps: Vec<String>,
    pub qa: QaNotes,
}

/// Result of the impact-expansion stage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub additional_files: Vec<String>,
}

/// A comment on a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    pub author: String,
    pub body: String,
}

/// Pull request context handed to the summary stage
///
/// Several pull requests are merged into one value before synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PullRequestContext {
    pub title: String,
    pub description: String,
    pub diff: String,
    pub comments: Vec<CommentEntry>,
}
