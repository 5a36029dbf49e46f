//! Pipeline coordination
//!
//! Fan-out fetch, aggregation and the phase-ordered run. Tolerated
//! failures (single URL fetches, impact analysis) are logged where they
//! happen; everything in `PipelineError` aborts the run.

mod aggregate;
mod fetch;
mod pipeline;

pub use aggregate::AggregatedContext;
pub use fetch::{fetch_all, FetchResults, FetchTargets, SourceResult, Sources};
pub use pipeline::{Pipeline, RunOutcome, RunRequest};

use crate::clients::ClientError;
use crate::llm::SummaryError;
use crate::urls::UrlFormatError;

/// Fatal run errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A requested source kind has no credential
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    UrlFormat(#[from] UrlFormatError),

    /// Stage 2 failed: backend, extraction, parse or validation
    #[error(transparent)]
    Synthesis(#[from] SummaryError),

    #[error("Failed to write summary to {issue}: {source}")]
    Write {
        issue: String,
        #[source]
        source: ClientError,
    },

    /// Printing the document or banner failed
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
