//! Reddit listing access: decoded models, the authenticated listing client and
//! the OAuth token provider.

mod auth;
mod client;
pub mod models;

use reqwest::StatusCode;
use thiserror::Error;

pub use auth::TokenProvider;
pub use client::{ListingSource, RedditClient};
pub use models::{Listing, Post, SubredditDetails};

/// Failures fetching a listing. Each of these fails the whole feed request.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("listing request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Subreddit is private.")]
    Forbidden,
    #[error("Subreddit not found.")]
    NotFound,
    #[error("listing source returned {0}")]
    Status(StatusCode),
    #[error("failed to decode listing: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unable to login. {0}")]
    Auth(String),
}
