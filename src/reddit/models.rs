//! Reddit listing JSON, decoded into the fields the feed pipeline reads.
//!
//! Reddit omits or nulls most fields depending on the post type, so nearly
//! everything is defaulted.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Top-level `{kind, data}` listing envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub data: ListingData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<ListingChild>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingChild {
    #[serde(default)]
    pub kind: String,
    pub data: Post,
}

impl Listing {
    /// Posts in listing order.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.data.children.iter().map(|child| &child.data)
    }

    /// Subreddit details carried by the first post, if any.
    #[must_use]
    pub fn subreddit_details(&self) -> Option<&SubredditDetails> {
        self.data
            .children
            .first()
            .and_then(|child| child.data.sr_detail.as_ref())
    }
}

/// A single link ("t3") in a listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub author: String,
    pub permalink: String,
    pub url: String,
    pub selftext: String,
    #[serde(deserialize_with = "null_as_default")]
    pub selftext_html: String,
    pub is_self: bool,
    pub created_utc: f64,
    pub over_18: bool,
    pub link_flair_text: Option<String>,
    pub score: i64,
    pub thumbnail: String,
    pub media: Option<Media>,
    pub secure_media: Option<Media>,
    pub media_metadata: Option<BTreeMap<String, MediaMetadata>>,
    pub gallery_data: Option<GalleryData>,
    pub crosspost_parent_list: Option<Vec<Post>>,
    pub sr_detail: Option<SubredditDetails>,
}

impl Post {
    /// Flair text, or empty when the post has none.
    #[must_use]
    pub fn flair(&self) -> &str {
        self.link_flair_text.as_deref().unwrap_or_default()
    }

    /// The post's own hosted video, if Reddit attached one.
    #[must_use]
    pub fn reddit_video(&self) -> Option<&RedditVideo> {
        self.secure_media
            .as_ref()
            .and_then(|media| media.reddit_video.as_ref())
    }

    /// The oEmbed block of the post's media, if any.
    #[must_use]
    pub fn oembed(&self) -> Option<&Oembed> {
        self.media.as_ref().and_then(|media| media.oembed.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Media {
    pub oembed: Option<Oembed>,
    pub reddit_video: Option<RedditVideo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Oembed {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub html: String,
    pub provider_name: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditVideo {
    pub fallback_url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub is_gif: bool,
}

/// One entry of `media_metadata`, keyed by media id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaMetadata {
    pub status: Option<String>,
    #[serde(rename = "e")]
    pub element: Option<String>,
    #[serde(rename = "m")]
    pub mime: Option<String>,
    #[serde(rename = "s")]
    pub source: Option<MediaSource>,
}

/// Full-size variants of a media entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaSource {
    #[serde(rename = "u")]
    pub url: Option<String>,
    pub gif: Option<String>,
    pub mp4: Option<String>,
    #[serde(rename = "x")]
    pub width: Option<u32>,
    #[serde(rename = "y")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GalleryData {
    pub items: Vec<GalleryItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GalleryItem {
    pub media_id: String,
    pub caption: Option<String>,
}

/// Subreddit metadata embedded in each post when requested with `sr_detail=1`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubredditDetails {
    pub title: String,
    pub public_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub community_icon: String,
    pub url: String,
    pub display_name: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
