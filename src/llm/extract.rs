//! JSON extraction from free-form model output
//!
//! Grammar shared by both stages:
//! 1. the body of the first fenced block tagged `json`
//! 2. otherwise the span from the first `{` to the last `}`
//!
//! Callers decide what a miss means; this module never fails.

use regex::Regex;
use std::sync::OnceLock;

fn fenced_json_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```json\s*(.*?)```").expect("static regex"))
}

/// Locate the JSON candidate in `text`
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(caps) = fenced_json_pattern().captures(text) {
        if let Some(body) = caps.get(1) {
            return Some(body.as_str());
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
