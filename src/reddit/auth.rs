//! OAuth password grant against Reddit's token endpoint.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::ListingError;
use crate::config::RedditCredentials;

/// Tokens are refreshed this long before Reddit says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Obtains and caches a bearer token for the configured account.
#[derive(Debug)]
pub struct TokenProvider {
    token_url: String,
    user_agent: String,
    credentials: RedditCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    #[must_use]
    pub fn new(token_url: &str, user_agent: &str, credentials: RedditCredentials) -> Self {
        Self {
            token_url: token_url.to_string(),
            user_agent: user_agent.to_string(),
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, logging in again when the cached one is stale.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::Auth`] if the token endpoint rejects the login.
    pub async fn bearer_token(&self, client: &Client) -> Result<String, ListingError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
            debug!("Cached bearer token expired");
        }

        let token = self.request_token(client).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self, client: &Client) -> Result<CachedToken, ListingError> {
        info!(username = %self.credentials.username, "Logging in to Reddit");

        let response = client
            .post(&self.token_url)
            .header("User-Agent", &self.user_agent)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ListingError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::Auth(format!(
                "token endpoint returned {status}; check your credentials"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ListingError::Auth(format!("invalid token response: {e}")))?;

        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(3600));
        Ok(CachedToken {
            access_token: body.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(EXPIRY_MARGIN),
        })
    }
}
