//! In-memory title cache using DashMap (stands in for Redis on a single node)

use async_trait::async_trait;
use dashmap::DashMap;
use item_core::ports::TitleCache;
use item_core::StoreError;
use std::collections::HashSet;

/// Set-of-titles cache held in process memory.
///
/// Entries are never evicted; the cache grows with the number of items.
pub struct MemoryTitleCache {
    sets: DashMap<String, HashSet<String>>,
}

impl MemoryTitleCache {
    pub fn new() -> Self {
        Self {
            sets: DashMap::new(),
        }
    }
}

impl Default for MemoryTitleCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TitleCache for MemoryTitleCache {
    async fn add_member(&self, set_key: &str, title: &str) -> Result<(), StoreError> {
        self.sets
            .entry(set_key.to_string())
            .or_default()
            .insert(title.to_string());
        Ok(())
    }

    async fn list_members(&self, set_key: &str) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .sets
            .get(set_key)
            .map(|set| set.clone())
            .unwrap_or_default())
    }
}
