//! Item types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An item as stored in the durable store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
}

/// Title-only projection returned by list reads
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSummary {
    pub title: String,
}

impl From<Item> for ItemSummary {
    fn from(item: Item) -> Self {
        Self { title: item.title }
    }
}

impl From<String> for ItemSummary {
    fn from(title: String) -> Self {
        Self { title }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    #[error("title must not be empty")]
    Empty,
}

/// A validated, non-empty item title.
///
/// The text is kept exactly as given; only titles that are empty or consist
/// solely of whitespace are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemTitle(String);

impl ItemTitle {
    pub fn parse(raw: impl Into<String>) -> Result<Self, TitleError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TitleError::Empty);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Body of `POST /items`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub title: String,
}
