//! Summary synthesis (stage 2) and document validation
//!
//! Unlike impact analysis, every failure here is fatal: a document that
//! does not pass `validate_summary` never reaches the issue tracker.

use serde_json::{Map, Value};

use crate::llm::adapters::{AdapterError, LlmAdapter};
use crate::llm::extract::extract_json;
use crate::llm::prompts::build_summary_prompt;
use crate::llm::types::{PullRequestContext, QaNotes, Status, SummaryDocument};

/// Schema violations, reported one at a time in field order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Summary must be an object")]
    NotAnObject,

    #[error("{0} must be a string")]
    NotAString(&'static str),

    #[error("cause must be a string or null")]
    InvalidCause,

    #[error("{0} must be an array")]
    NotAnArray(&'static str),

    #[error("{field}[{index}] must be a string")]
    NonStringElement { field: &'static str, index: usize },

    #[error("status must be one of: investigating, in_progress, resolved, monitoring")]
    InvalidStatus,

    #[error("qa must be an object")]
    QaNotAnObject,
}

/// Errors from summary generation
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("Summary generation failed: {0}")]
    Backend(#[from] AdapterError),

    #[error("AI response did not contain valid JSON")]
    NoJson,

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid summary: {0}")]
    Validation(#[from] ValidationError),
}

fn require_string(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ValidationError::NotAString(field))
}

fn require_string_array(
    obj: &Map<String, Value>,
    key: &str,
    field: &'static str,
) -> Result<Vec<String>, ValidationError> {
    let items = obj
        .get(key)
        .and_then(Value::as_array)
        .ok_or(ValidationError::NotAnArray(field))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or(ValidationError::NonStringElement { field, index })
        })
        .collect()
}

/// Validate a parsed value against the summary schema
///
/// Fields are checked in the order title, background, problem, impact,
/// cause, actions, status, nextSteps, qa. The first violation wins.
pub fn validate_summary(value: &Value) -> Result<SummaryDocument, ValidationError> {
    let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

    let title = require_string(obj, "title")?;
    let background = require_string(obj, "background")?;
    let problem = require_string(obj, "problem")?;
    let impact = require_string(obj, "impact")?;

    // Must be present: an omitted key is not the same as an explicit null
    let cause = match obj.get("cause") {
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        _ => return Err(ValidationError::InvalidCause),
    };

    let actions = require_string_array(obj, "actions", "actions")?;

    let status = obj
        .get("status")
        .and_then(Value::as_str)
        .and_then(Status::from_str)
        .ok_or(ValidationError::InvalidStatus)?;

    let next_steps = require_string_array(obj, "nextSteps", "nextSteps")?;

    let qa = obj
        .get("qa")
        .and_then(Value::as_object)
        .ok_or(ValidationError::QaNotAnObject)?;
    let cautions = require_string_array(qa, "cautions", "qa.cautions")?;
    let related_features = require_string_array(qa, "relatedFeatures", "qa.relatedFeatures")?;

    Ok(SummaryDocument {
        title,
        background,
        problem,
        impact,
        cause,
        actions,
        status,
        next_steps,
        qa: QaNotes {
            cautions,
            related_features,
        },
    })
}

/// Parse and validate a raw stage-2 response
pub fn parse_summary_response(text: &str) -> Result<SummaryDocument, SummaryError> {
    let candidate = extract_json(text).ok_or(SummaryError::NoJson)?;
    let value: Value = serde_json::from_str(candidate)?;
    Ok(validate_summary(&value)?)
}

/// Generate the summary document from the aggregated context
pub async fn generate_summary<A>(
    adapter: &A,
    chat: Option<&str>,
    wiki: Option<&str>,
    pull_request: Option<&PullRequestContext>,
    impact_context: &str,
) -> Result<SummaryDocument, SummaryError>
where
    A: LlmAdapter + ?Sized,
{
    let prompt = build_summary_prompt(chat, wiki, pull_request, impact_context);
    let text = adapter.generate(&prompt).await?;
    parse_summary_response(&text)
}
