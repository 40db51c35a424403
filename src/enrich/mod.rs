//! Article enrichment: turning a post into the HTML body of its feed item.

pub mod classify;
mod fetch;
pub mod loader;
pub mod markup;
pub mod og;
mod readability;
pub mod resolver;

use reqwest::StatusCode;
use thiserror::Error;

pub use classify::{Classification, MediaKind};
pub use fetch::{Fetcher, Page};
pub use loader::{ArticleLoader, EnrichmentKey, LoadError};
pub use resolver::{ArticleResolver, RedditArticleResolver, Strategy};

/// Why a single post could not be enriched. Never fatal to the feed.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("{url} is {content_type}, not a web page")]
    NotHtml { url: String, content_type: String },
    #[error("video missing from json")]
    VideoMissing,
    #[error("link preview for {url} has no {missing}")]
    PreviewIncomplete { url: String, missing: &'static str },
    #[error("enrichment cancelled")]
    Cancelled,
}

impl ResolveError {
    fn transport(url: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            source,
        }
    }

    fn preview_incomplete(url: &str, missing: &'static str) -> Self {
        Self::PreviewIncomplete {
            url: url.to_string(),
            missing,
        }
    }
}
