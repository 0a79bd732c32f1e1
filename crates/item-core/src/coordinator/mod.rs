//! Multi-store consistency coordinator
//!
//! Decides, on every read and write, which store to consult or update and in
//! what order:
//!
//! - list: read-through. A non-empty cache answers on its own; an empty cache
//!   falls back to the durable store and is backfilled title by title.
//! - create: write-through. The durable insert is the commit point; cache and
//!   index writes afterwards are best-effort and never fail the request.
//! - search: index only, and any index failure reads as "no matches".
//!
//! Store calls within one request run strictly one after another. Every call
//! is bounded by a per-call timeout.

pub mod best_effort;

pub use best_effort::{best_effort, SecondaryWrite};

use crate::error::{CoordinatorError, StoreError, StoreKind};
use crate::ports::{DurableStore, SearchIndex, TitleCache};
use crate::{IndexedDocument, ItemSummary, ItemTitle, SearchHit, TEXT_FIELD};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Set key holding every known title in the cache
pub const DEFAULT_CACHE_KEY: &str = "items";

/// Search index holding the title documents
pub const DEFAULT_INDEX_NAME: &str = "items";

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Coordinator {
    durable: Arc<dyn DurableStore>,
    cache: Arc<dyn TitleCache>,
    index: Arc<dyn SearchIndex>,
    cache_key: String,
    index_name: String,
    call_timeout: Duration,
}

impl Coordinator {
    pub fn new(
        durable: Arc<dyn DurableStore>,
        cache: Arc<dyn TitleCache>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            durable,
            cache,
            index,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Upper bound for every single store call
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Prepare the stores at process start.
    ///
    /// The durable table is required. A search index that cannot be prepared
    /// only disables search results, so that failure is logged and ignored.
    pub async fn bootstrap(&self) -> Result<(), CoordinatorError> {
        info!("Preparing durable store...");
        self.bounded(self.durable.create_table())
            .await
            .map_err(|source| CoordinatorError::StoreUnavailable {
                store: StoreKind::Durable,
                source,
            })?;

        info!("Preparing search index '{}'...", self.index_name);
        best_effort(
            StoreKind::Index,
            &self.index_name,
            self.bounded(self.index.ensure_index(&self.index_name)),
        )
        .await;

        Ok(())
    }

    /// List the titles of all items
    pub async fn list_items(&self) -> Result<Vec<ItemSummary>, CoordinatorError> {
        match self.bounded(self.cache.list_members(&self.cache_key)).await {
            Ok(titles) if !titles.is_empty() => {
                debug!("Cache hit: {} titles", titles.len());
                let mut titles: Vec<String> = titles.into_iter().collect();
                titles.sort();
                return Ok(titles.into_iter().map(ItemSummary::from).collect());
            }
            Ok(_) => debug!("Cache empty, reading durable store"),
            Err(e) if e.is_connection_failure() => {
                error!("Cache read failed: {}", e);
                return Err(CoordinatorError::StoreUnavailable {
                    store: StoreKind::Cache,
                    source: e,
                });
            }
            Err(e) => warn!("Cache read failed, treating cache as empty: {}", e),
        }

        let items = self
            .bounded(self.durable.list_items())
            .await
            .map_err(|source| {
                error!("Durable store read failed: {}", source);
                CoordinatorError::StoreUnavailable {
                    store: StoreKind::Durable,
                    source,
                }
            })?;

        let mut backfilled = 0;
        for item in &items {
            let outcome = best_effort(
                StoreKind::Cache,
                &item.title,
                self.bounded(self.cache.add_member(&self.cache_key, &item.title)),
            )
            .await;
            if outcome.is_applied() {
                backfilled += 1;
            }
        }
        debug!("Backfilled {} of {} titles into cache", backfilled, items.len());

        Ok(items.into_iter().map(ItemSummary::from).collect())
    }

    /// Create an item and return the accepted title
    pub async fn create_item(&self, title: &ItemTitle) -> Result<String, CoordinatorError> {
        let title = title.as_str();

        let id = self
            .bounded(self.durable.insert_item(title))
            .await
            .map_err(|source| {
                error!("Durable insert of {:?} failed: {}", title, source);
                CoordinatorError::CreateFailed {
                    title: title.to_string(),
                    source,
                }
            })?;
        info!("Created item {} ({:?})", id, title);

        best_effort(
            StoreKind::Cache,
            title,
            self.bounded(self.cache.add_member(&self.cache_key, title)),
        )
        .await;

        let document = IndexedDocument::new(title);
        best_effort(
            StoreKind::Index,
            title,
            self.bounded(self.index.index_document(&self.index_name, &document)),
        )
        .await;

        Ok(title.to_string())
    }

    /// Full-text search over item titles. Never fails: errors yield no hits.
    pub async fn search_items(&self, text: &str) -> Vec<SearchHit> {
        match self
            .bounded(self.index.match_query(&self.index_name, TEXT_FIELD, text))
            .await
        {
            Ok(hits) => {
                debug!("Search {:?} returned {} hits", text, hits.len());
                hits
            }
            Err(e) => {
                warn!("Search {:?} failed, returning no hits: {}", text, e);
                Vec::new()
            }
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.call_timeout)),
        }
    }
}
