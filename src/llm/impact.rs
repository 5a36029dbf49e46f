//! Impact analysis (stage 1)
//!
//! Advisory: every failure degrades to an empty file list. Nothing here
//! can abort the run.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::llm::adapters::LlmAdapter;
use crate::llm::extract::extract_json;
use crate::llm::prompts::build_impact_analysis_prompt;
use crate::llm::types::ImpactAnalysis;

/// Ask the backend which further files deserve a look
pub async fn analyze_impact<A>(
    adapter: &A,
    diff: &str,
    changed_files: &[String],
    importers: &[String],
    importer_contents: &BTreeMap<String, String>,
) -> ImpactAnalysis
where
    A: LlmAdapter + ?Sized,
{
    let prompt = build_impact_analysis_prompt(diff, changed_files, importers, importer_contents);

    let text = match adapter.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!("impact analysis backend call failed, continuing without it: {}", e);
            return ImpactAnalysis::default();
        }
    };

    let mut analysis = parse_impact_response(&text);

    let known: HashSet<&str> = changed_files
        .iter()
        .chain(importers.iter())
        .map(String::as_str)
        .collect();
    analysis
        .additional_files
        .retain(|file| !known.contains(file.as_str()));

    analysis
}

/// Leniently parse a stage-1 response
///
/// Missing JSON, malformed JSON and a non-array `additionalFiles` all
/// yield the empty result. Non-string entries are dropped.
pub fn parse_impact_response(text: &str) -> ImpactAnalysis {
    let Some(candidate) = extract_json(text) else {
        debug!("impact response contained no JSON");
        return ImpactAnalysis::default();
    };

    let parsed: Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(e) => {
            warn!("impact response JSON did not parse: {}", e);
            return ImpactAnalysis::default();
        }
    };

    let additional_files = match parsed.get("additionalFiles").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => {
            debug!("impact response had no additionalFiles array");
            Vec::new()
        }
    };

    ImpactAnalysis { additional_files }
}
