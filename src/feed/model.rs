use chrono::{DateTime, Utc};

/// One enriched post, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub author: String,
    /// Raw self-text of the post.
    pub description: String,
    /// Enriched HTML body; empty when resolution failed.
    pub content: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedImage {
    pub url: String,
    pub title: String,
    pub link: String,
}

/// A subreddit feed. Items are in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub image: Option<FeedImage>,
    pub items: Vec<FeedItem>,
}
