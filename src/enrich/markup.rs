//! HTML fragments emitted into feed item content.

use std::fmt::Write as _;
use std::sync::LazyLock;

use html_escape::{decode_html_entities, encode_double_quoted_attribute, encode_text};
use regex::Regex;

use super::og::VideoEmbed;
use crate::constants::IMAGE_PREVIEW_PREFIX;
use crate::reddit::models::{MediaMetadata, Post};

/// Anchors pointing at the image preview host, with the href captured.
static PREVIEW_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r#"(?is)<a\s[^>]*?href="({}[^"]*)"[^>]*>.*?</a>"#,
        regex::escape(IMAGE_PREVIEW_PREFIX)
    );
    Regex::new(&pattern).unwrap()
});

/// Explicit width/height attributes, quoted or bare.
static DIMENSION_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s(?:width|height)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

#[must_use]
pub fn unescape(s: &str) -> String {
    decode_html_entities(s).into_owned()
}

/// Replace anchors that link to preview images with the images themselves.
#[must_use]
pub fn inline_preview_images(html: &str) -> String {
    PREVIEW_ANCHOR
        .replace_all(html, r#"<img src="$1" />"#)
        .into_owned()
}

/// Self-text rendered for the feed: unescaped, with preview links inlined.
#[must_use]
pub fn self_text(post: &Post) -> String {
    inline_preview_images(&unescape(&post.selftext_html))
}

/// Drop explicit sizing so the feed reader decides how large embeds render.
#[must_use]
pub fn strip_dimensions(html: &str) -> String {
    DIMENSION_ATTR.replace_all(html, "").into_owned()
}

/// Undo the `&amp;` escaping Reddit applies to media URLs.
#[must_use]
pub fn fix_amp(url: &str) -> String {
    url.replace("&amp;", "&")
}

/// `<img>` for one gallery entry, preferring the animated variant.
///
/// Entries without any usable variant render as nothing.
#[must_use]
pub fn media_image(media: Option<&MediaMetadata>) -> String {
    let Some(source) = media.and_then(|m| m.source.as_ref()) else {
        return String::new();
    };
    let url = source
        .gif
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| source.url.as_deref().filter(|s| !s.is_empty()));
    match url {
        Some(url) => format!(r#"<img src="{}" /><br/>"#, fix_amp(url)),
        None => String::new(),
    }
}

/// Gallery markup in gallery order, or metadata order when there is no gallery.
///
/// Returns `None` when the post has no media metadata.
#[must_use]
pub fn gallery(post: &Post) -> Option<String> {
    let metadata = post.media_metadata.as_ref().filter(|m| !m.is_empty())?;

    let mut html = String::from("<div>");
    match post.gallery_data.as_ref().filter(|g| !g.items.is_empty()) {
        Some(gallery) => {
            for item in &gallery.items {
                html.push_str(&media_image(metadata.get(&item.media_id)));
            }
        }
        None => {
            for media in metadata.values() {
                html.push_str(&media_image(Some(media)));
            }
        }
    }
    html.push_str("</div>");
    Some(html)
}

/// Rewrite link quirks that stop direct playback.
#[must_use]
pub fn cleanup_url(url: &str) -> String {
    if url.contains("imgur") {
        if let Some(stem) = url.strip_suffix("gifv") {
            return format!("{stem}webm");
        }
    }
    url.to_string()
}

#[must_use]
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[must_use]
pub fn image_tag(url: &str) -> String {
    format!(
        r#"<img src="{}" class="webfeedsFeaturedVisual"/>"#,
        encode_double_quoted_attribute(url)
    )
}

#[must_use]
pub fn video_tag(url: &str, mime: &str) -> String {
    format!(
        r#"<video><source src="{}" type="{}" /></video>"#,
        encode_double_quoted_attribute(url),
        encode_double_quoted_attribute(mime)
    )
}

/// Reddit-hosted video plus the post thumbnail as a fallback visual.
#[must_use]
pub fn reddit_video(fallback_url: &str, thumbnail: &str) -> String {
    format!(
        r#"<iframe src="{}" style="border:none;"></iframe> <img src="{}" class="webfeedsFeaturedVisual"/>"#,
        encode_double_quoted_attribute(fallback_url),
        encode_double_quoted_attribute(thumbnail)
    )
}

/// Embedded player for a known video host, with its poster image.
#[must_use]
pub fn video_embed(embed: &VideoEmbed) -> String {
    format!(
        r#"<div><iframe src="{}" width="{}" height="{}"></iframe> <img src="{}" class="webfeedsFeaturedVisual"/></div>"#,
        encode_double_quoted_attribute(&embed.iframe),
        encode_double_quoted_attribute(&embed.width),
        encode_double_quoted_attribute(&embed.height),
        encode_double_quoted_attribute(&embed.image),
    )
}

/// Link-preview card for pages that are neither media nor readable articles.
#[must_use]
pub fn preview_card(url: &str, image: &str, title: &str) -> String {
    let bare = strip_query(url);
    let mut card = String::new();
    let _ = write!(
        card,
        r#"<a href="{href}" style="text-decoration:none;color:inherit"><div style="border:1px solid gray"><img src="{image}" /><div style="border-top:1px solid gray;padding:4px"><span><strong>{title}</strong></span><br /><span><small>{caption}</small></span></div></div></a>"#,
        href = encode_double_quoted_attribute(bare),
        image = encode_double_quoted_attribute(image),
        title = encode_text(title),
        caption = encode_text(bare),
    );
    card
}
