//! Concurrent source retrieval
//!
//! Every requested URL is fetched at once, across all three source kinds.
//! Each fetch settles into its own `SourceResult`; one failure never
//! affects a sibling.

use futures::future::join_all;
use std::sync::Arc;

use crate::clients::{
    ChatSource, ChatThread, ClientError, PullRequest, PullRequestSource, WikiPage, WikiSource,
};
use crate::urls::{ConfluencePageRef, PullRequestRef, SlackThreadRef};

/// Outcome of fetching one URL
#[derive(Debug)]
pub enum SourceResult<T> {
    Ok { value: T, origin: String },
    Err { error: ClientError, origin: String },
}

impl<T> SourceResult<T> {
    pub fn from_result(result: Result<T, ClientError>, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        match result {
            Ok(value) => SourceResult::Ok { value, origin },
            Err(error) => SourceResult::Err { error, origin },
        }
    }

    /// URL this result was fetched from
    pub fn origin(&self) -> &str {
        match self {
            SourceResult::Ok { origin, .. } | SourceResult::Err { origin, .. } => origin,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, SourceResult::Ok { .. })
    }
}

/// Configured source collaborators; `None` means the kind is disabled
#[derive(Clone, Default)]
pub struct Sources {
    pub chat: Option<Arc<dyn ChatSource>>,
    pub wiki: Option<Arc<dyn WikiSource>>,
    pub pull_requests: Option<Arc<dyn PullRequestSource>>,
}

/// Parsed URLs to fetch, each paired with the URL as given
#[derive(Debug, Clone, Default)]
pub struct FetchTargets {
    pub chat: Vec<(String, SlackThreadRef)>,
    pub wiki: Vec<(String, ConfluencePageRef)>,
    pub pull_requests: Vec<(String, PullRequestRef)>,
}

impl FetchTargets {
    pub fn is_empty(&self) -> bool {
        self.chat.is_empty() && self.wiki.is_empty() && self.pull_requests.is_empty()
    }
}

/// Settled results, in request order per kind
#[derive(Debug, Default)]
pub struct FetchResults {
    pub chat: Vec<SourceResult<ChatThread>>,
    pub wiki: Vec<SourceResult<WikiPage>>,
    pub pull_requests: Vec<SourceResult<PullRequest>>,
}

/// Fetch every target concurrently and join once all have settled
///
/// Targets of a disabled kind produce no results.
pub async fn fetch_all(sources: &Sources, targets: &FetchTargets) -> FetchResults {
    let chat = async {
        match &sources.chat {
            Some(source) => {
                join_all(targets.chat.iter().map(|(origin, thread)| async move {
                    SourceResult::from_result(source.fetch_thread(thread).await, origin.as_str())
                }))
                .await
            }
            None => Vec::new(),
        }
    };

    let wiki = async {
        match &sources.wiki {
            Some(source) => {
                join_all(targets.wiki.iter().map(|(origin, page)| async move {
                    SourceResult::from_result(source.fetch_page(page).await, origin.as_str())
                }))
                .await
            }
            None => Vec::new(),
        }
    };

    let pull_requests = async {
        match &sources.pull_requests {
            Some(source) => {
                join_all(targets.pull_requests.iter().map(|(origin, pr)| async move {
                    SourceResult::from_result(source.fetch_pull_request(pr).await, origin.as_str())
                }))
                .await
            }
            None => Vec::new(),
        }
    };

    let (chat, wiki, pull_requests) = tokio::join!(chat, wiki, pull_requests);

    FetchResults {
        chat,
        wiki,
        pull_requests,
    }
}
