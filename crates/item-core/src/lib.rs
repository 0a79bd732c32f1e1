//! Item Tracker Core Library
//!
//! The multi-store consistency coordinator and the port traits of the three
//! stores it orchestrates: a durable store (source of truth), a title cache
//! (read accelerator) and a search index (text-query accelerator).

// Re-export pure types from item-types
pub use item_types::*;

pub mod coordinator;
pub mod error;
pub mod ports;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use coordinator::{
    best_effort, Coordinator, SecondaryWrite, DEFAULT_CACHE_KEY, DEFAULT_CALL_TIMEOUT,
    DEFAULT_INDEX_NAME,
};
pub use error::{CoordinatorError, StoreError, StoreKind};
