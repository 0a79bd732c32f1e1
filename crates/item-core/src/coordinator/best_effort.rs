//! Best-effort secondary writes
//!
//! Writes to the cache and the search index happen after the durable store
//! has committed. Their failures are logged and reported as a
//! [`SecondaryWrite`] value, never as an error, so a caller cannot turn them
//! into a failed request by accident.

use crate::error::{StoreError, StoreKind};
use std::future::Future;
use tracing::{debug, warn};

/// Outcome of a secondary write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryWrite {
    Applied,
    Skipped(StoreError),
}

impl SecondaryWrite {
    pub fn is_applied(&self) -> bool {
        matches!(self, SecondaryWrite::Applied)
    }
}

/// Run a secondary write against `store`, absorbing any failure
pub async fn best_effort<F>(store: StoreKind, subject: &str, write: F) -> SecondaryWrite
where
    F: Future<Output = Result<(), StoreError>>,
{
    match write.await {
        Ok(()) => {
            debug!("Wrote {:?} to {}", subject, store);
            SecondaryWrite::Applied
        }
        Err(e) => {
            warn!("Skipping {} write for {:?}: {}", store, subject, e);
            SecondaryWrite::Skipped(e)
        }
    }
}
