use std::sync::LazyLock;

use dom_smoothie::Readability;
use regex::Regex;
use tracing::debug;

/// Links that are never worth running article extraction on.
static SKIP_READABILITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(reddit\.com|\.jpg|\.png|\.pdf)").unwrap());

#[must_use]
pub fn should_attempt(url: &str) -> bool {
    !SKIP_READABILITY.is_match(url)
}

/// Extract the readable article body from an HTML page.
///
/// Returns `None` when the page has no recognisable article text.
#[must_use]
pub fn extract_article(html: &str, url: &str) -> Option<String> {
    let mut readability = match Readability::new(html.to_string(), Some(url), None) {
        Ok(r) => r,
        Err(e) => {
            debug!(url, "Readability setup failed: {e}");
            return None;
        }
    };

    match readability.parse() {
        Ok(article) if !article.text_content.to_string().trim().is_empty() => {
            Some(article.content.to_string())
        }
        Ok(_) => {
            debug!(url, "Page has no readable text");
            None
        }
        Err(e) => {
            debug!(url, "Page is not readable: {e}");
            None
        }
    }
}
