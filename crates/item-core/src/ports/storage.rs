//! Storage traits for the durable store and the title cache

use crate::error::StoreError;
use crate::Item;
use async_trait::async_trait;
use std::collections::HashSet;

/// Durable store: the source of truth for items
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Create the items table if it does not exist
    async fn create_table(&self) -> Result<(), StoreError>;

    /// Insert a title and return the id the store assigned to it.
    ///
    /// An existing title is reported as [`StoreError::Duplicate`].
    async fn insert_item(&self, title: &str) -> Result<i64, StoreError>;

    async fn list_items(&self) -> Result<Vec<Item>, StoreError>;
}

/// Cache: an unordered set of known titles under a set key
#[async_trait]
pub trait TitleCache: Send + Sync {
    /// Add a title to the set. Adding an existing member is a no-op.
    async fn add_member(&self, set_key: &str, title: &str) -> Result<(), StoreError>;

    async fn list_members(&self, set_key: &str) -> Result<HashSet<String>, StoreError>;
}
