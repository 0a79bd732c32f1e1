//! Search index trait

use crate::error::StoreError;
use crate::{IndexedDocument, SearchHit};
use async_trait::async_trait;

/// Search index: a text-searchable projection of item titles
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create the index if it does not exist yet
    async fn ensure_index(&self, name: &str) -> Result<(), StoreError>;

    async fn index_document(&self, name: &str, document: &IndexedDocument)
        -> Result<(), StoreError>;

    /// Run a match query on `field`, returning hits in the engine's relevance order
    async fn match_query(
        &self,
        name: &str,
        field: &str,
        text: &str,
    ) -> Result<Vec<SearchHit>, StoreError>;
}
