use super::model::{Feed, FeedImage, FeedItem};

/// Generate RSS 2.0 feed XML
#[must_use]
pub fn generate_rss(feed: &Feed) -> String {
    let items: String = feed
        .items
        .iter()
        .map(render_item)
        .collect::<Vec<_>>()
        .join("\n");

    let image = feed.image.as_ref().map(render_image).unwrap_or_default();
    let title = xml_escape(&feed.title);
    let link = xml_escape(&feed.link);
    let description = xml_escape(&feed.description);
    let build_date = chrono::Utc::now().to_rfc2822();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>{title}</title>
    <link>{link}</link>
    <description>{description}</description>
    <lastBuildDate>{build_date}</lastBuildDate>
{image}{items}
  </channel>
</rss>"#
    )
}

fn render_image(image: &FeedImage) -> String {
    format!(
        r"    <image>
      <url>{}</url>
      <title>{}</title>
      <link>{}</link>
    </image>
",
        xml_escape(&image.url),
        xml_escape(&image.title),
        xml_escape(&image.link)
    )
}

fn render_item(item: &FeedItem) -> String {
    let title = xml_escape(&item.title);
    let link = xml_escape(&item.link);
    let guid = xml_escape(&item.id);
    let author = xml_escape(&item.author);
    let pub_date = item.created.to_rfc2822();
    let description = cdata(&item.description);
    let content = cdata(&item.content);

    format!(
        r#"    <item>
      <title>{title}</title>
      <link>{link}</link>
      <guid isPermaLink="false">{guid}</guid>
      <dc:creator>{author}</dc:creator>
      <pubDate>{pub_date}</pubDate>
      <description>{description}</description>
      <content:encoded>{content}</content:encoded>
    </item>"#
    )
}

/// Wrap text in a CDATA section, splitting any `]]>` it contains.
fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}

/// Escape XML special characters
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
