mod error;
mod routes;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::enrich::{ArticleLoader, Fetcher, RedditArticleResolver};
use crate::reddit::{ListingSource, RedditClient};

pub use error::AppError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub listings: Arc<dyn ListingSource>,
    pub loader: Arc<ArticleLoader>,
}

impl AppState {
    /// Wire the production listing client and article resolver.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        let listings = RedditClient::new(&config).context("Failed to build listing client")?;
        let fetcher =
            Fetcher::new(config.fetch_timeout).context("Failed to build article fetcher")?;
        let resolver = RedditArticleResolver::new(fetcher, config.readability_enabled);
        let loader = ArticleLoader::new(Arc::new(resolver), config.batch_capacity);

        Ok(Self {
            config: Arc::new(config),
            listings: Arc::new(listings),
            loader: Arc::new(loader),
        })
    }
}

/// Start the web server and run until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let state = AppState::new(config)?;
    let app = create_app(state);

    info!(addr = %addr, "Starting HTTP web server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Web server error")?;

    Ok(())
}

/// Create the main application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
