//! Batched, deduplicating article loader.
//!
//! Distinct posts are resolved once each, in batches of bounded size. Every
//! task in a batch is joined before the next batch starts, and results are
//! handed back in request order regardless of completion order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::resolver::ArticleResolver;
use crate::reddit::models::Post;

/// Deduplication key: two posts are the same enrichment request iff their ids match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnrichmentKey(String);

impl EnrichmentKey {
    #[must_use]
    pub fn of(post: &Post) -> Self {
        Self(post.id.clone())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A post whose enrichment task produced no value at all.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("enrichment task for {0} did not complete")]
    Incomplete(String),
}

pub struct ArticleLoader {
    resolver: Arc<dyn ArticleResolver>,
    batch_capacity: usize,
}

impl ArticleLoader {
    #[must_use]
    pub fn new(resolver: Arc<dyn ArticleResolver>, batch_capacity: usize) -> Self {
        Self {
            resolver,
            batch_capacity: batch_capacity.max(1),
        }
    }

    /// Resolve content for every post, one result per input in input order.
    ///
    /// Resolution failures are logged and become empty content; only a task
    /// that panicked or was aborted yields an error.
    pub async fn load_many(
        &self,
        posts: &[Post],
        cancel: &CancellationToken,
    ) -> Vec<Result<String, LoadError>> {
        let mut seen = HashSet::new();
        let distinct: Vec<&Post> = posts
            .iter()
            .filter(|post| seen.insert(EnrichmentKey::of(post)))
            .collect();

        let mut resolved = HashMap::with_capacity(distinct.len());
        for (index, batch) in distinct.chunks(self.batch_capacity).enumerate() {
            debug!(batch = index, size = batch.len(), "Dispatching enrichment batch");
            resolved.extend(self.dispatch(batch, cancel).await);
        }

        posts
            .iter()
            .map(|post| {
                let key = EnrichmentKey::of(post);
                resolved
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| LoadError::Incomplete(key.0))
            })
            .collect()
    }

    /// Resolve one batch concurrently and wait for all of it.
    async fn dispatch(
        &self,
        batch: &[&Post],
        cancel: &CancellationToken,
    ) -> HashMap<EnrichmentKey, String> {
        let mut tasks = JoinSet::new();
        for post in batch {
            let resolver = Arc::clone(&self.resolver);
            let post = (*post).clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let content = resolve_best_effort(resolver.as_ref(), &post, &cancel).await;
                (EnrichmentKey::of(&post), content)
            });
        }

        let mut results = HashMap::with_capacity(batch.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, content)) => {
                    results.insert(key, content);
                }
                Err(e) => error!("Enrichment task failed: {e}"),
            }
        }
        results
    }
}

async fn resolve_best_effort(
    resolver: &dyn ArticleResolver,
    post: &Post,
    cancel: &CancellationToken,
) -> String {
    match resolver.resolve(post, cancel).await {
        Ok(content) => content,
        Err(e) => {
            warn!(post_id = %post.id, url = %post.url, "Failed to resolve article: {e}");
            String::new()
        }
    }
}
