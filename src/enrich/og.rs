//! Open Graph metadata extraction from fetched pages.
//!
//! Two shapes are pulled out: the player metadata of known video hosts, and
//! the summary used for link-preview cards.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static OG_JPEG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image"][content$=".jpg"]"#).unwrap());
static OG_VIDEO_IFRAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:video:iframe"]"#).unwrap());
static OG_VIDEO_WIDTH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:video:width"]"#).unwrap());
static OG_VIDEO_HEIGHT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:video:height"]"#).unwrap());
static META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

/// Player metadata for an embeddable video page. Missing tags stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoEmbed {
    pub image: String,
    pub iframe: String,
    pub width: String,
    pub height: String,
}

/// Summary of an arbitrary page for a link-preview card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPreview {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

#[must_use]
pub fn extract_video_embed(html: &str) -> VideoEmbed {
    let document = Html::parse_document(html);
    let content = |selector: &Selector| {
        document
            .select(selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .unwrap_or_default()
            .trim()
            .to_string()
    };

    VideoEmbed {
        image: content(&OG_JPEG_IMAGE),
        iframe: content(&OG_VIDEO_IFRAME),
        width: content(&OG_VIDEO_WIDTH),
        height: content(&OG_VIDEO_HEIGHT),
    }
}

/// Extract title, description, image and tags from a page's metadata.
///
/// Open Graph values win over Twitter card values, which win over the
/// document `<title>`.
#[must_use]
pub fn extract_link_preview(html: &str) -> LinkPreview {
    let document = Html::parse_document(html);
    let mut preview = LinkPreview::default();
    let mut twitter_title = None;
    let mut twitter_image = None;

    for element in document.select(&META) {
        let Some(key) = meta_key(element) else {
            continue;
        };
        let Some(content) = element
            .value()
            .attr("content")
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            continue;
        };

        match key.as_str() {
            "og:title" => set_once(&mut preview.title, content),
            "og:description" | "description" => set_once(&mut preview.description, content),
            "og:image" | "og:image:url" | "og:image:secure_url" => {
                set_once(&mut preview.image, content);
            }
            "twitter:title" => set_once(&mut twitter_title, content),
            "twitter:image" | "twitter:image:src" => set_once(&mut twitter_image, content),
            "keywords" => preview.tags.extend(
                content
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(ToString::to_string),
            ),
            "article:tag" => preview.tags.push(content.to_string()),
            _ => {}
        }
    }

    if preview.title.is_none() {
        preview.title = twitter_title.or_else(|| {
            document
                .select(&TITLE)
                .next()
                .map(|t| t.text().collect::<String>().trim().to_string())
                .filter(|t| !t.is_empty())
        });
    }
    if preview.image.is_none() {
        preview.image = twitter_image;
    }

    preview
}

fn meta_key(element: ElementRef<'_>) -> Option<String> {
    element
        .value()
        .attr("property")
        .or_else(|| element.value().attr("name"))
        .map(str::to_ascii_lowercase)
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_embed() {
        let html = r#"
            <html>
                <head>
                    <meta property="og:image" content="https://thumbs.gfycat.com/Cat-poster.webp">
                    <meta property="og:image" content="https://thumbs.gfycat.com/Cat-poster.jpg">
                    <meta property="og:video:iframe" content="https://gfycat.com/ifr/cat">
                    <meta property="og:video:width" content="640">
                    <meta property="og:video:height" content="360">
                </head>
            </html>
        "#;

        let embed = extract_video_embed(html);

        assert_eq!(embed.image, "https://thumbs.gfycat.com/Cat-poster.jpg");
        assert_eq!(embed.iframe, "https://gfycat.com/ifr/cat");
        assert_eq!(embed.width, "640");
        assert_eq!(embed.height, "360");
    }

    #[test]
    fn test_missing_video_tags_are_empty() {
        let embed = extract_video_embed("<html><head><title>x</title></head></html>");
        assert_eq!(embed, VideoEmbed::default());
    }

    #[test]
    fn test_extract_link_preview_prefers_og() {
        let html = r#"
            <html>
                <head>
                    <title>Document Title</title>
                    <meta name="twitter:title" content="Twitter Title">
                    <meta property="og:title" content="  OG Title  ">
                    <meta property="og:image" content="https://example.com/og.png">
                    <meta name="twitter:image" content="https://example.com/tw.png">
                    <meta name="description" content="Plain description">
                    <meta name="keywords" content="rust, feeds, ,reddit">
                    <meta property="article:tag" content="news">
                </head>
            </html>
        "#;

        let preview = extract_link_preview(html);

        assert_eq!(preview.title.as_deref(), Some("OG Title"));
        assert_eq!(preview.image.as_deref(), Some("https://example.com/og.png"));
        assert_eq!(preview.description.as_deref(), Some("Plain description"));
        assert_eq!(preview.tags, vec!["rust", "feeds", "reddit", "news"]);
    }

    #[test]
    fn test_extract_link_preview_fallbacks() {
        let html = r#"
            <html>
                <head>
                    <title> Document Title </title>
                    <meta name="twitter:image" content="https://example.com/tw.png">
                    <meta property="og:description" content="">
                </head>
            </html>
        "#;

        let preview = extract_link_preview(html);

        assert_eq!(preview.title.as_deref(), Some("Document Title"));
        assert_eq!(preview.image.as_deref(), Some("https://example.com/tw.png"));
        assert_eq!(preview.description, None);
        assert!(preview.tags.is_empty());
    }

    #[test]
    fn test_extract_link_preview_empty_page() {
        assert_eq!(extract_link_preview(""), LinkPreview::default());
    }
}
