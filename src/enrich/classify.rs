//! Coarse media classification by content signature.
//!
//! The declared `Content-Type` is ignored; only the leading bytes of the
//! body decide what a link points at.

use tokio_util::sync::CancellationToken;

use super::fetch::{read_prefix, Fetcher};
use super::ResolveError;
use crate::constants::SNIFF_WINDOW;

/// What a linked resource is, as far as the feed cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

/// Detected MIME type and the media kind it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: MediaKind,
    pub mime: String,
}

impl Classification {
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let kind = if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Unknown
        };
        Self {
            kind,
            mime: mime.to_string(),
        }
    }
}

/// Classify raw leading bytes of a resource.
#[must_use]
pub fn sniff(bytes: &[u8]) -> Classification {
    let mime = infer::get(bytes).map_or("application/octet-stream", |t| t.mime_type());
    Classification::from_mime(mime)
}

/// Fetch `url` and classify it from its body signature.
///
/// Transport errors are returned as-is and are not retried.
pub async fn classify(
    fetcher: &Fetcher,
    url: &str,
    cancel: &CancellationToken,
) -> Result<Classification, ResolveError> {
    let response = fetcher.get(url, cancel).await?;
    let prefix = read_prefix(response, SNIFF_WINDOW, cancel).await?;
    let classification = sniff(&prefix);
    tracing::debug!(url, mime = %classification.mime, "Classified link");
    Ok(classification)
}
