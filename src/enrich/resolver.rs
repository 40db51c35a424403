use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::classify::{classify, MediaKind};
use super::fetch::Fetcher;
use super::markup;
use super::og::{extract_link_preview, extract_video_embed};
use super::readability;
use super::ResolveError;
use crate::reddit::models::{Oembed, Post, RedditVideo};

/// Produces the HTML content of a feed item from a post.
#[async_trait]
pub trait ArticleResolver: Send + Sync {
    /// Resolve `post` to an HTML fragment. Network work must observe `cancel`.
    async fn resolve(&self, post: &Post, cancel: &CancellationToken)
        -> Result<String, ResolveError>;
}

/// How a non-self post's linked content gets rendered.
#[derive(Debug)]
pub enum Strategy<'a> {
    EmbeddedVideo(&'a Oembed),
    Gallery(String),
    KnownVideoHost,
    RedditVideo,
    Generic,
}

impl<'a> Strategy<'a> {
    /// Pick the first strategy that applies to `post`.
    #[must_use]
    pub fn select(post: &'a Post) -> Self {
        if let Some(oembed) = post
            .oembed()
            .filter(|o| o.kind == "video" && !o.html.is_empty())
        {
            return Self::EmbeddedVideo(oembed);
        }
        if let Some(html) = markup::gallery(post) {
            return Self::Gallery(html);
        }
        if post.url.contains("gfycat") {
            return Self::KnownVideoHost;
        }
        if post.url.contains("v.redd.it") {
            return Self::RedditVideo;
        }
        Self::Generic
    }
}

/// The production strategy chain over Reddit posts.
#[derive(Debug, Clone)]
pub struct RedditArticleResolver {
    fetcher: Fetcher,
    readability: bool,
}

impl RedditArticleResolver {
    #[must_use]
    pub fn new(fetcher: Fetcher, readability: bool) -> Self {
        Self {
            fetcher,
            readability,
        }
    }

    async fn known_video_host(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ResolveError> {
        // Player tags missing from an error page render as empty attributes.
        let page = self.fetcher.page_any_status(url, cancel).await?;
        Ok(markup::video_embed(&extract_video_embed(&page.body)))
    }

    async fn generic(&self, url: &str, cancel: &CancellationToken) -> Result<String, ResolveError> {
        let url = markup::cleanup_url(url);
        let classification = classify(&self.fetcher, &url, cancel).await?;

        match classification.kind {
            MediaKind::Image => Ok(markup::image_tag(&url)),
            MediaKind::Video => Ok(markup::video_tag(&url, &classification.mime)),
            MediaKind::Unknown => self.page_summary(&url, cancel).await,
        }
    }

    /// Readable article text when enabled and available, otherwise a preview card.
    async fn page_summary(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String, ResolveError> {
        let page = self.fetcher.page(url, cancel).await?;

        if self.readability && readability::should_attempt(url) {
            if let Some(article) = readability::extract_article(&page.body, url) {
                return Ok(article);
            }
        }

        let preview = extract_link_preview(&page.body);
        let title = preview
            .title
            .ok_or_else(|| ResolveError::preview_incomplete(url, "title"))?;
        let image = preview
            .image
            .ok_or_else(|| ResolveError::preview_incomplete(url, "image"))?;
        Ok(markup::preview_card(url, &image, &title))
    }
}

#[async_trait]
impl ArticleResolver for RedditArticleResolver {
    async fn resolve(
        &self,
        post: &Post,
        cancel: &CancellationToken,
    ) -> Result<String, ResolveError> {
        let mut content = String::new();

        if !post.selftext.is_empty() {
            content.push_str(&markup::self_text(post));
        }
        if post.is_self {
            return Ok(content);
        }

        let strategy = Strategy::select(post);
        debug!(post_id = %post.id, url = %post.url, ?strategy, "Resolving article");

        let rendered = match strategy {
            Strategy::EmbeddedVideo(oembed) => {
                markup::strip_dimensions(&markup::unescape(&oembed.html))
            }
            Strategy::Gallery(html) => html,
            Strategy::KnownVideoHost => self.known_video_host(&post.url, cancel).await?,
            Strategy::RedditVideo => {
                let video = hosted_video(post).ok_or(ResolveError::VideoMissing)?;
                markup::reddit_video(&video.fallback_url, &post.thumbnail)
            }
            Strategy::Generic => self.generic(&post.url, cancel).await?,
        };

        content.push_str(&rendered);
        Ok(content)
    }
}

/// The post's hosted video, falling back to the first cross-post parent's.
fn hosted_video(post: &Post) -> Option<&RedditVideo> {
    post.reddit_video().or_else(|| {
        post.crosspost_parent_list
            .as_ref()
            .and_then(|parents| parents.first())
            .and_then(Post::reddit_video)
    })
}
