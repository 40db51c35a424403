use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::filter::FeedFilters;
use super::model::{Feed, FeedImage, FeedItem};
use crate::enrich::ArticleLoader;
use crate::enrich::markup::strip_query;
use crate::reddit::models::{Listing, Post, SubredditDetails};

/// Listing shapes that cannot become a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Subreddit not found.")]
    EmptyListing,
    #[error("Subreddit not found.")]
    MissingSubredditDetails,
}

/// Filter, enrich and order a listing into a feed.
///
/// Feed metadata comes from the first post of the unfiltered listing. An
/// empty listing is rejected before anything is fetched.
///
/// # Errors
///
/// Returns [`FeedError`] if the listing has no posts or its first post
/// carries no subreddit details.
pub async fn assemble(
    listing: &Listing,
    filters: &FeedFilters,
    loader: &ArticleLoader,
    link_base: &str,
    cancel: &CancellationToken,
) -> Result<Feed, FeedError> {
    let first = listing
        .data
        .children
        .first()
        .ok_or(FeedError::EmptyListing)?;
    let details = first
        .data
        .sr_detail
        .as_ref()
        .ok_or(FeedError::MissingSubredditDetails)?;

    let link_base = link_base.trim_end_matches('/');
    let mut feed = feed_header(details, link_base);

    let posts: Vec<Post> = listing
        .posts()
        .filter(|post| filters.allows(post))
        .cloned()
        .collect();
    debug!(
        total = listing.data.children.len(),
        kept = posts.len(),
        "Filtered listing"
    );

    let contents = loader.load_many(&posts, cancel).await;
    for (post, content) in posts.iter().zip(contents) {
        match content {
            Ok(content) => feed.items.push(feed_item(post, content, link_base)),
            Err(e) => warn!(post_id = %post.id, "Skipping post: {e}"),
        }
    }

    Ok(feed)
}

fn feed_header(details: &SubredditDetails, link_base: &str) -> Feed {
    let link = format!("{link_base}{}", details.url);
    let image = (!details.community_icon.is_empty()).then(|| FeedImage {
        url: strip_query(&details.community_icon).to_string(),
        title: details.title.clone(),
        link: link.clone(),
    });

    Feed {
        title: details.title.clone(),
        link,
        description: details.public_description.clone(),
        image,
        items: Vec::new(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn feed_item(post: &Post, content: String, link_base: &str) -> FeedItem {
    FeedItem {
        id: post.id.clone(),
        title: post.title.clone(),
        link: format!("{link_base}{}", post.permalink),
        author: post.author.clone(),
        description: post.selftext.clone(),
        content,
        created: DateTime::<Utc>::from_timestamp(post.created_utc as i64, 0).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::{ArticleResolver, ResolveError};
    use crate::reddit::models::{ListingChild, ListingData};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct EchoResolver;

    #[async_trait]
    impl ArticleResolver for EchoResolver {
        async fn resolve(
            &self,
            post: &Post,
            _cancel: &CancellationToken,
        ) -> Result<String, ResolveError> {
            // Later posts finish first.
            let delay = 50u64.saturating_sub(post.score.unsigned_abs() * 2);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if post.url.is_empty() {
                return Err(ResolveError::VideoMissing);
            }
            Ok(format!("<p>{}</p>", post.id))
        }
    }

    fn details() -> SubredditDetails {
        SubredditDetails {
            title: "Rust".to_string(),
            public_description: "Rust programming".to_string(),
            community_icon: "https://styles.redditmedia.com/icon.png?width=256&s=1".to_string(),
            url: "/r/rust/".to_string(),
            display_name: "rust".to_string(),
        }
    }

    fn listing(scores: &[i64]) -> Listing {
        let children = scores
            .iter()
            .enumerate()
            .map(|(i, score)| ListingChild {
                kind: "t3".to_string(),
                data: Post {
                    id: format!("p{i}"),
                    title: format!("Post {i}"),
                    author: "ferris".to_string(),
                    permalink: format!("/r/rust/comments/p{i}/"),
                    url: format!("https://example.com/{i}"),
                    created_utc: 1_700_000_000.0,
                    score: *score,
                    sr_detail: (i == 0).then(details),
                    ..Default::default()
                },
            })
            .collect();
        Listing {
            kind: "Listing".to_string(),
            data: ListingData {
                children,
                ..Default::default()
            },
        }
    }

    fn loader() -> ArticleLoader {
        ArticleLoader::new(Arc::new(EchoResolver), 10)
    }

    #[tokio::test]
    async fn test_items_keep_listing_order() {
        let listing = listing(&[1, 5, 10, 15, 20]);
        let feed = assemble(
            &listing,
            &FeedFilters::default(),
            &loader(),
            "https://www.reddit.com",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let ids: Vec<&str> = feed.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p1", "p2", "p3", "p4"]);
        assert_eq!(feed.items[3].content, "<p>p3</p>");
    }

    #[tokio::test]
    async fn test_score_limit_filters_in_order() {
        let listing = listing(&[1, 5, 10, 15, 20]);
        let filters = FeedFilters {
            score_limit: Some(10),
            ..Default::default()
        };

        let feed = assemble(
            &listing,
            &filters,
            &loader(),
            "https://www.reddit.com",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let ids: Vec<&str> = feed.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p3", "p4"]);
    }

    #[tokio::test]
    async fn test_metadata_from_first_unfiltered_post() {
        let listing = listing(&[1, 50]);
        let filters = FeedFilters {
            score_limit: Some(10),
            ..Default::default()
        };

        let feed = assemble(
            &listing,
            &filters,
            &loader(),
            "https://old.reddit.com/",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(feed.title, "Rust");
        assert_eq!(feed.link, "https://old.reddit.com/r/rust/");
        assert_eq!(feed.description, "Rust programming");
        let image = feed.image.unwrap();
        assert_eq!(image.url, "https://styles.redditmedia.com/icon.png");
        assert_eq!(image.link, "https://old.reddit.com/r/rust/");

        assert_eq!(feed.items.len(), 1);
        let item = &feed.items[0];
        assert_eq!(item.link, "https://old.reddit.com/r/rust/comments/p1/");
        assert_eq!(item.author, "ferris");
        assert_eq!(item.created.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_failed_resolution_keeps_item_with_empty_content() {
        let mut listing = listing(&[1, 2]);
        listing.data.children[1].data.url = String::new();

        let feed = assemble(
            &listing,
            &FeedFilters::default(),
            &loader(),
            "https://www.reddit.com",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(feed.items.len(), 2);
        assert_eq!(feed.items[1].content, "");
    }

    #[tokio::test]
    async fn test_empty_listing_is_rejected() {
        let listing = listing(&[]);
        let result = assemble(
            &listing,
            &FeedFilters::default(),
            &loader(),
            "https://www.reddit.com",
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(FeedError::EmptyListing)));
    }

    #[tokio::test]
    async fn test_missing_details_is_rejected() {
        let mut listing = listing(&[1]);
        listing.data.children[0].data.sr_detail = None;

        let result = assemble(
            &listing,
            &FeedFilters::default(),
            &loader(),
            "https://www.reddit.com",
            &CancellationToken::new(),
        )
        .await;

        assert!(matches!(result, Err(FeedError::MissingSubredditDetails)));
    }

    #[tokio::test]
    async fn test_everything_filtered_gives_empty_feed() {
        let listing = listing(&[1, 2]);
        let filters = FeedFilters {
            flair: Some("Nope".to_string()),
            ..Default::default()
        };

        let feed = assemble(
            &listing,
            &filters,
            &loader(),
            "https://www.reddit.com",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(feed.title, "Rust");
        assert!(feed.items.is_empty());
    }
}
