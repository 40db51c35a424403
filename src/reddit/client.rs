use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, warn};
use url::Url;

use super::auth::TokenProvider;
use super::models::Listing;
use super::ListingError;
use crate::config::Config;

/// Paths Reddit answers with a subreddit listing. Anything else (typically a
/// redirect to search for unknown subreddits) is treated as not found.
static LISTING_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^/r/[a-z0-9_]+(/(hot|new|top|rising|controversial))?\.json$").unwrap()
});

/// Source of subreddit listings.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch and decode the listing for `path` (e.g. `/r/rust`), forwarding `query`.
    async fn fetch_listing(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Listing, ListingError>;
}

/// Listing source backed by Reddit's JSON API.
#[derive(Debug)]
pub struct RedditClient {
    http: Client,
    base_url: String,
    user_agent: String,
    tokens: Option<TokenProvider>,
}

impl RedditClient {
    /// Build a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, ListingError> {
        let http = Client::builder()
            .timeout(config.listing_timeout)
            .build()?;

        let tokens = config
            .credentials
            .clone()
            .map(|creds| TokenProvider::new(&config.token_url, &config.user_agent, creds));

        Ok(Self {
            http,
            base_url: config.listing_base_url().trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            tokens,
        })
    }
}

#[async_trait]
impl ListingSource for RedditClient {
    async fn fetch_listing(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Listing, ListingError> {
        let url = listing_url(&self.base_url, path, query)?;
        debug!(url = %url, "Fetching listing");

        let mut request = self
            .http
            .get(url)
            .header("User-Agent", &self.user_agent);
        if let Some(tokens) = &self.tokens {
            let token = tokens.bearer_token(&self.http).await?;
            request = request.header("Authorization", format!("bearer {token}"));
        }

        let response = request.send().await.map_err(|e| {
            error!("Listing request failed: {e}");
            ListingError::Transport(e)
        })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            error!(path, "Subreddit is private");
            return Err(ListingError::Forbidden);
        }

        if status == StatusCode::NOT_FOUND || !LISTING_PATH.is_match(response.url().path()) {
            error!(path, final_path = response.url().path(), "Subreddit not found");
            return Err(ListingError::NotFound);
        }

        if !status.is_success() {
            error!(path, %status, "Listing request returned an error status");
            return Err(ListingError::Status(status));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to decode listing: {e}");
            ListingError::Decode(e)
        })
    }
}

/// Build the upstream JSON URL for a listing path.
fn listing_url(base: &str, path: &str, query: &[(String, String)]) -> Result<Url, ListingError> {
    let trimmed = path.trim_end_matches('/');
    let json_path = if trimmed.contains(".json") {
        warn!(path, "Appending .json to the path is deprecated");
        trimmed.to_string()
    } else {
        format!("{trimmed}.json")
    };

    let mut url = Url::parse(&format!("{base}{json_path}")).map_err(|_| ListingError::NotFound)?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query.iter().filter(|(key, _)| key != "sr_detail") {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("sr_detail", "1");
    }
    Ok(url)
}
