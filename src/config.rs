use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::constants::DEFAULT_USER_AGENT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Reddit account used for the OAuth password grant.
#[derive(Clone)]
pub struct RedditCredentials {
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("username", &self.username)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web Server
    pub web_host: String,
    pub web_port: u16,
    pub home_redirect: Option<String>,
    pub cache_max_age: Duration,

    // Listing source
    pub reddit_api_url: String,
    pub oauth_api_url: String,
    pub token_url: String,
    pub user_agent: String,
    pub credentials: Option<RedditCredentials>,
    pub listing_timeout: Duration,

    // Links emitted into the feed
    pub reddit_url: String,

    // Enrichment
    pub batch_capacity: usize,
    pub fetch_timeout: Duration,
    pub request_timeout: Duration,
    pub readability_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("PORT", 8080)?,
            home_redirect: optional_env("HOME_REDIRECT_URL"),
            cache_max_age: Duration::from_secs(parse_env_u64("CACHE_MAX_AGE_SECS", 1800)?),

            // Listing source
            reddit_api_url: env_or_default("REDDIT_API_URL", "https://www.reddit.com"),
            oauth_api_url: env_or_default("REDDIT_OAUTH_API_URL", "https://oauth.reddit.com"),
            token_url: env_or_default(
                "REDDIT_TOKEN_URL",
                "https://www.reddit.com/api/v1/access_token",
            ),
            user_agent: env_or_default("USER_AGENT", DEFAULT_USER_AGENT),
            credentials: credentials_from_env(),
            listing_timeout: Duration::from_secs(parse_env_u64("LISTING_TIMEOUT_SECS", 30)?),

            reddit_url: env_or_default("REDDIT_URL", "https://www.reddit.com"),

            // Enrichment
            batch_capacity: parse_env_usize("BATCH_CAPACITY", 10)?,
            fetch_timeout: Duration::from_secs(parse_env_u64("FETCH_TIMEOUT_SECS", 15)?),
            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),
            readability_enabled: parse_env_bool("READABILITY_ENABLED", false)?,
        })
    }

    /// Configuration with built-in defaults, independent of the environment.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
            home_redirect: None,
            cache_max_age: Duration::from_secs(1800),
            reddit_api_url: "https://www.reddit.com".to_string(),
            oauth_api_url: "https://oauth.reddit.com".to_string(),
            token_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
            listing_timeout: Duration::from_secs(10),
            reddit_url: "https://www.reddit.com".to_string(),
            batch_capacity: 10,
            fetch_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            readability_enabled: false,
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: "BATCH_CAPACITY".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        for (name, value) in [
            ("REDDIT_API_URL", &self.reddit_api_url),
            ("REDDIT_OAUTH_API_URL", &self.oauth_api_url),
            ("REDDIT_TOKEN_URL", &self.token_url),
            ("REDDIT_URL", &self.reddit_url),
        ] {
            if let Err(e) = url::Url::parse(value) {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: format!("'{value}' is not a valid URL: {e}"),
                });
            }
        }
        for (name, timeout) in [
            ("REQUEST_TIMEOUT_SECS", self.request_timeout),
            ("LISTING_TIMEOUT_SECS", self.listing_timeout),
        ] {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Base URL listings are fetched from, depending on whether we log in.
    #[must_use]
    pub fn listing_base_url(&self) -> &str {
        if self.credentials.is_some() {
            &self.oauth_api_url
        } else {
            &self.reddit_api_url
        }
    }
}

fn credentials_from_env() -> Option<RedditCredentials> {
    let username = optional_env("REDDIT_USERNAME");
    let password = optional_env("REDDIT_PASSWORD");
    let client_id = optional_env("OAUTH_CLIENT_ID");
    let client_secret = optional_env("OAUTH_CLIENT_SECRET");

    match (username, password, client_id, client_secret) {
        (Some(username), Some(password), Some(client_id), Some(client_secret)) => {
            Some(RedditCredentials {
                username,
                password,
                client_id,
                client_secret,
            })
        }
        (Some(_), Some(_), _, _) => {
            warn!("Login credentials provided without an OAuth client; ignoring them");
            None
        }
        _ => None,
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}
