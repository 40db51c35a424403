use std::time::Instant;

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::error::AppError;
use super::AppState;
use crate::constants::RSS_CONTENT_TYPE;
use crate::feed::{assemble, generate_rss, FeedFilters};

const USAGE: &str = "Subreddit RSS\n\nRequest a subreddit path to get its feed, e.g. /r/rust or /r/rust/top?t=week.\nFilters: safe=true, scoreLimit=<n>, flair=<text>.\n";

/// Create the router. Every path without its own route is treated as a subreddit path.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/info/ping", get(ping))
        .route("/favicon.ico", get(favicon))
        .fallback(subreddit_feed)
}

async fn home(State(state): State<AppState>) -> Response {
    match &state.config.home_redirect {
        Some(target) => (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, target.clone())],
        )
            .into_response(),
        None => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            USAGE,
        )
            .into_response(),
    }
}

async fn ping() -> &'static str {
    "OK"
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn subreddit_feed(State(state): State<AppState>, uri: Uri) -> Result<Response, AppError> {
    let started = Instant::now();
    let path = uri.path();

    // Cancelled when this handler returns, is dropped, or runs out of time.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    spawn_deadline(cancel.clone(), state.config.request_timeout, path.to_string());

    let pairs: Vec<(String, String)> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let filters = FeedFilters::from_pairs(&pairs);
    let upstream: Vec<(String, String)> = pairs
        .into_iter()
        .filter(|(key, _)| !FeedFilters::is_filter_key(key))
        .collect();

    let listing = state.listings.fetch_listing(path, &upstream).await?;
    let feed = assemble(
        &listing,
        &filters,
        &state.loader,
        &state.config.reddit_url,
        &cancel,
    )
    .await?;
    let body = generate_rss(&feed);

    info!("OK {path} ({}ms)", started.elapsed().as_millis());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, RSS_CONTENT_TYPE.to_string()),
            (
                header::CACHE_CONTROL,
                format!("public, max-age={}", state.config.cache_max_age.as_secs()),
            ),
        ],
        body,
    )
        .into_response())
}

fn spawn_deadline(cancel: CancellationToken, timeout: std::time::Duration, path: String) {
    tokio::spawn(async move {
        tokio::select! {
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(timeout) => {
                warn!(path = %path, timeout_secs = timeout.as_secs(), "Request deadline reached, cancelling enrichment");
                cancel.cancel();
            }
        }
    });
}
