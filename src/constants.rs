//! Shared constants used across the application.

/// Default user agent for listing requests.
pub const DEFAULT_USER_AGENT: &str = concat!("subreddit-rss/", env!("CARGO_PKG_VERSION"));

/// User agent sent when fetching post-linked pages.
///
/// Some hosts refuse non-browser agents, so link fetches look like a regular browser.
pub const FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Host that serves inline images referenced from self-text.
pub const IMAGE_PREVIEW_PREFIX: &str = "https://preview.redd.it";

/// Number of leading body bytes inspected when sniffing a content signature.
pub const SNIFF_WINDOW: usize = 8 * 1024;

/// Largest page body read for previews, embeds and article extraction.
pub const PAGE_LIMIT: usize = 2 * 1024 * 1024;

/// Content type of the feed response.
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml";
