//! In-memory adapter fakes with call counters and injectable failures

use crate::error::StoreError;
use crate::ports::{DurableStore, SearchIndex, TitleCache};
use crate::{IndexedDocument, Item, SearchHit};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A failure switch: while set, every guarded call returns the stored error
#[derive(Default)]
pub struct Fault(Mutex<Option<StoreError>>);

impl Fault {
    pub fn set(&self, error: StoreError) {
        *self.0.lock().unwrap() = Some(error);
    }

    pub fn clear(&self) {
        *self.0.lock().unwrap() = None;
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.0.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Artificial latency applied before a call completes
#[derive(Default)]
pub struct Latency(Mutex<Option<Duration>>);

impl Latency {
    pub fn set(&self, delay: Duration) {
        *self.0.lock().unwrap() = Some(delay);
    }

    async fn wait(&self) {
        let delay = *self.0.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

pub fn connection_dropped() -> StoreError {
    StoreError::Unavailable("connection reset by peer".to_string())
}

/// Durable store backed by a vector, enforcing title uniqueness
#[derive(Default)]
pub struct FakeDurableStore {
    items: Mutex<Vec<Item>>,
    next_id: AtomicI64,
    pub insert_fault: Fault,
    pub list_fault: Fault,
    pub latency: Latency,
    insert_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl FakeDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_titles(titles: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut items = store.items.lock().unwrap();
            for title in titles {
                let id = store.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                items.push(Item {
                    id,
                    title: title.to_string(),
                });
            }
        }
        store
    }

    pub fn titles(&self) -> Vec<String> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .map(|item| item.title.clone())
            .collect()
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurableStore for FakeDurableStore {
    async fn create_table(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_item(&self, title: &str) -> Result<i64, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.latency.wait().await;
        self.insert_fault.check()?;

        let mut items = self.items.lock().unwrap();
        if items.iter().any(|item| item.title == title) {
            return Err(StoreError::Duplicate(title.to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        items.push(Item {
            id,
            title: title.to_string(),
        });
        Ok(id)
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.latency.wait().await;
        self.list_fault.check()?;
        Ok(self.items.lock().unwrap().clone())
    }
}

/// Title cache backed by a map of sets
#[derive(Default)]
pub struct FakeTitleCache {
    sets: Mutex<HashMap<String, HashSet<String>>>,
    pub read_fault: Fault,
    pub write_fault: Fault,
    pub latency: Latency,
    add_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl FakeTitleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(set_key: &str, titles: &[&str]) -> Self {
        let cache = Self::new();
        cache.sets.lock().unwrap().insert(
            set_key.to_string(),
            titles.iter().map(|t| t.to_string()).collect(),
        );
        cache
    }

    pub fn members(&self, set_key: &str) -> HashSet<String> {
        self.sets
            .lock()
            .unwrap()
            .get(set_key)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop every entry, as after a cache restart
    pub fn flush(&self) {
        self.sets.lock().unwrap().clear();
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TitleCache for FakeTitleCache {
    async fn add_member(&self, set_key: &str, title: &str) -> Result<(), StoreError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        self.latency.wait().await;
        self.write_fault.check()?;
        self.sets
            .lock()
            .unwrap()
            .entry(set_key.to_string())
            .or_default()
            .insert(title.to_string());
        Ok(())
    }

    async fn list_members(&self, set_key: &str) -> Result<HashSet<String>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.latency.wait().await;
        self.read_fault.check()?;
        Ok(self.members(set_key))
    }
}

/// Search index that scores documents by shared lowercase words
#[derive(Default)]
pub struct FakeSearchIndex {
    indices: Mutex<HashMap<String, Vec<IndexedDocument>>>,
    pub write_fault: Fault,
    pub query_fault: Fault,
    pub latency: Latency,
    ensure_calls: AtomicUsize,
    index_calls: AtomicUsize,
}

impl FakeSearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self, name: &str) -> Vec<IndexedDocument> {
        self.indices
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indices.lock().unwrap().contains_key(name)
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }
}

fn words(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

#[async_trait]
impl SearchIndex for FakeSearchIndex {
    async fn ensure_index(&self, name: &str) -> Result<(), StoreError> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        self.write_fault.check()?;
        self.indices
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn index_document(
        &self,
        name: &str,
        document: &IndexedDocument,
    ) -> Result<(), StoreError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        self.latency.wait().await;
        self.write_fault.check()?;
        // Like the real engine, indexing into a missing index creates it
        self.indices
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .push(document.clone());
        Ok(())
    }

    async fn match_query(
        &self,
        name: &str,
        field: &str,
        text: &str,
    ) -> Result<Vec<SearchHit>, StoreError> {
        self.latency.wait().await;
        self.query_fault.check()?;
        if field != crate::TEXT_FIELD {
            return Ok(Vec::new());
        }

        let query = words(text);
        let mut hits: Vec<SearchHit> = self
            .documents(name)
            .into_iter()
            .enumerate()
            .filter_map(|(position, document)| {
                let doc_words = words(&document.text);
                let matched = doc_words.intersection(&query).count();
                (matched > 0).then(|| {
                    let score = matched as f64 / doc_words.len() as f64;
                    SearchHit::new(name, position.to_string(), Some(score), &document)
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(hits)
    }
}
