use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response};
use tokio_util::sync::CancellationToken;

use super::ResolveError;
use crate::constants::{FETCH_USER_AGENT, PAGE_LIMIT};

/// Unauthenticated HTTP access to post-linked resources.
///
/// Every request races the caller's cancellation token, so a dropped feed
/// request or an expired deadline aborts in-flight fetches.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(FETCH_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` regardless of the response status.
    pub async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<Response, ResolveError> {
        let request = self.client.get(url).send();
        until_cancelled(cancel, request)
            .await?
            .map_err(|source| ResolveError::transport(url, source))
    }

    /// GET `url`, treating any non-success status as an error.
    pub async fn get_ok(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Response, ResolveError> {
        let response = self.get(url, cancel).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    /// GET an HTML page, reading at most [`PAGE_LIMIT`] bytes of it.
    ///
    /// Non-success statuses and non-HTML responses are rejected before the
    /// body is read.
    pub async fn page(&self, url: &str, cancel: &CancellationToken) -> Result<Page, ResolveError> {
        let response = self.get_ok(url, cancel).await?;
        let content_type = content_type(&response);
        if !is_html(&content_type) {
            return Err(ResolveError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }
        read_page(response, content_type, cancel).await
    }

    /// GET a page whatever its status or type, reading at most [`PAGE_LIMIT`] bytes.
    pub async fn page_any_status(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Page, ResolveError> {
        let response = self.get(url, cancel).await?;
        let content_type = content_type(&response);
        read_page(response, content_type, cancel).await
    }
}

/// A fetched document, truncated to [`PAGE_LIMIT`].
#[derive(Debug, Clone)]
pub struct Page {
    pub content_type: String,
    pub body: String,
}

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn is_html(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "text/html" || essence == "application/xhtml+xml"
}

async fn read_page(
    response: Response,
    content_type: String,
    cancel: &CancellationToken,
) -> Result<Page, ResolveError> {
    let bytes = read_prefix(response, PAGE_LIMIT, cancel).await?;
    Ok(Page {
        content_type,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Read at most `limit` bytes of the response body.
pub async fn read_prefix(
    mut response: Response,
    limit: usize,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, ResolveError> {
    let url = response.url().to_string();
    let mut buf = Vec::with_capacity(limit.min(16 * 1024));
    while buf.len() < limit {
        let chunk = until_cancelled(cancel, response.chunk())
            .await?
            .map_err(|source| ResolveError::transport(&url, source))?;
        match chunk {
            Some(bytes) => buf.extend_from_slice(&bytes),
            None => break,
        }
    }
    buf.truncate(limit);
    Ok(buf)
}

async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, ResolveError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ResolveError::Cancelled),
        output = fut => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_ok_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let result = fetcher
            .get_ok(&format!("{}/gone", server.uri()), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ResolveError::Status { status, .. }) if status == 404));
    }

    #[tokio::test]
    async fn test_cancelled_token_aborts_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_secs(30)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fetcher.get(&server.uri(), &cancel).await;
        assert!(matches!(result, Err(ResolveError::Cancelled)));
    }

    #[tokio::test]
    async fn test_read_prefix_stops_at_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let cancel = CancellationToken::new();
        let response = fetcher.get(&server.uri(), &cancel).await.unwrap();
        let prefix = read_prefix(response, 100, &cancel).await.unwrap();

        assert_eq!(prefix.len(), 100);
    }

    #[tokio::test]
    async fn test_page_reports_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let page = fetcher
            .page(&server.uri(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(page.content_type, "text/html; charset=utf-8");
        assert_eq!(page.body, "<html></html>");
    }

    #[tokio::test]
    async fn test_page_rejects_non_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.7", "application/pdf"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let result = fetcher.page(&server.uri(), &CancellationToken::new()).await;

        assert!(matches!(
            result,
            Err(ResolveError::NotHtml { ref content_type, .. }) if content_type == "application/pdf"
        ));
    }

    #[tokio::test]
    async fn test_page_body_is_capped() {
        let server = MockServer::start().await;
        let body = format!("<html>{}</html>", "a".repeat(PAGE_LIMIT));
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let page = fetcher
            .page(&server.uri(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(page.body.len(), PAGE_LIMIT);
    }

    #[tokio::test]
    async fn test_page_any_status_keeps_error_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_raw("<p>gone</p>", "text/html"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new(Duration::from_secs(5)).unwrap();
        let page = fetcher
            .page_any_status(&server.uri(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(page.body, "<p>gone</p>");
    }

    #[test]
    fn test_is_html() {
        assert!(is_html("text/html"));
        assert!(is_html("TEXT/HTML; charset=utf-8"));
        assert!(is_html("application/xhtml+xml"));
        assert!(!is_html("application/pdf"));
        assert!(!is_html(""));
    }
}
