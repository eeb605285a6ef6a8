use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use tracing::debug;

use super::{
    error::ClientError,
    query_cache::{QueryCache, QueryKey},
};
use crate::models::tweets::{FeedCursor, TweetPage, TweetResponse};

/// Clears the fetching flag when the fetch finishes or its future is dropped.
struct FetchGuard<'a>(&'a AtomicBool);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_page(
        &self,
        key: &QueryKey,
        cursor: Option<FeedCursor>,
        limit: u32,
    ) -> Result<TweetPage, ClientError>;
}

/// Drives one infinite query: pages land in the shared cache under `key`.
pub struct InfiniteFeed {
    key: QueryKey,
    limit: u32,
    cache: Arc<QueryCache>,
    source: Arc<dyn FeedSource>,
    fetching: AtomicBool,
}

impl InfiniteFeed {
    pub fn new(
        key: QueryKey,
        limit: u32,
        cache: Arc<QueryCache>,
        source: Arc<dyn FeedSource>,
    ) -> Result<Self, ClientError> {
        if matches!(key, QueryKey::Profile { .. }) {
            return Err(ClientError::NotAFeed(key));
        }
        Ok(Self {
            key,
            limit,
            cache,
            source,
            fetching: AtomicBool::new(false),
        })
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    /// Nothing cached yet counts as "more to load".
    pub async fn has_more(&self) -> bool {
        match self.cache.pages(&self.key).await {
            Some(pages) => pages.last().is_some_and(|p| p.next_cursor.is_some()),
            None => true,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::Acquire)
    }

    /// Loads the page after the last cached cursor. Returns `false` without
    /// a request when the feed is exhausted or another fetch is running.
    pub async fn fetch_next(&self) -> Result<bool, ClientError> {
        if self
            .fetching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Fetch already running for {:?}", self.key);
            return Ok(false);
        }

        let _guard = FetchGuard(&self.fetching);
        self.load_next().await
    }

    async fn load_next(&self) -> Result<bool, ClientError> {
        let cursor = match self.cache.pages(&self.key).await {
            Some(pages) => match pages.last().and_then(|p| p.next_cursor) {
                Some(cursor) => Some(cursor),
                None => return Ok(false),
            },
            None => None,
        };

        let page = self.source.fetch_page(&self.key, cursor, self.limit).await?;
        debug!(
            "Fetched {} tweets for {:?}, more: {}",
            page.tweets.len(),
            self.key,
            page.next_cursor.is_some()
        );
        self.cache.append_page(self.key, page).await;
        Ok(true)
    }

    /// True when the viewport is within `threshold` items of the end of the
    /// loaded list and more pages exist.
    pub async fn should_fetch_more(&self, visible_index: usize, threshold: usize) -> bool {
        if self.is_fetching() || !self.has_more().await {
            return false;
        }
        let loaded = self.tweets().await.len();
        visible_index + threshold >= loaded
    }

    /// All loaded tweets, flattened in display order.
    pub async fn tweets(&self) -> Vec<TweetResponse> {
        self.cache
            .pages(&self.key)
            .await
            .unwrap_or_default()
            .into_iter()
            .flat_map(|page| page.tweets)
            .collect()
    }
}
