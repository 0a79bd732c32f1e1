//! Error types for the item tracker

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which of the three stores an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Durable,
    Cache,
    Index,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Durable => write!(f, "durable store"),
            StoreKind::Cache => write!(f, "cache"),
            StoreKind::Index => write!(f, "search index"),
        }
    }
}

/// Error reported by a store adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connection or transport failure
    #[error("connection failed: {0}")]
    Unavailable(String),

    #[error("duplicate title: {0}")]
    Duplicate(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The store answered, but with an error
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Hard connection failures, as opposed to errors the store itself returned
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout(_))
    }
}

/// Errors surfaced to callers of the coordinator.
///
/// Only the mandatory path can produce these. Cache and index write failures
/// during create, and every search failure, are absorbed before this point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("{store} unavailable: {source}")]
    StoreUnavailable {
        store: StoreKind,
        #[source]
        source: StoreError,
    },

    #[error("failed to create item {title:?}: {source}")]
    CreateFailed {
        title: String,
        #[source]
        source: StoreError,
    },
}

impl CoordinatorError {
    /// True when a create failed because the title already exists
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            CoordinatorError::CreateFailed {
                source: StoreError::Duplicate(_),
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failure_classification() {
        assert!(StoreError::Unavailable("refused".into()).is_connection_failure());
        assert!(StoreError::Timeout(Duration::from_secs(1)).is_connection_failure());
        assert!(!StoreError::Backend("WRONGTYPE".into()).is_connection_failure());
        assert!(!StoreError::Duplicate("x".into()).is_connection_failure());
    }

    #[test]
    fn test_duplicate_detection() {
        let dup = CoordinatorError::CreateFailed {
            title: "x".into(),
            source: StoreError::Duplicate("x".into()),
        };
        assert!(dup.is_duplicate());

        let down = CoordinatorError::CreateFailed {
            title: "x".into(),
            source: StoreError::Unavailable("reset".into()),
        };
        assert!(!down.is_duplicate());
    }

    #[test]
    fn test_display() {
        let err = CoordinatorError::StoreUnavailable {
            store: StoreKind::Cache,
            source: StoreError::Unavailable("connection refused".into()),
        };
        assert_eq!(
            err.to_string(),
            "cache unavailable: connection failed: connection refused"
        );
    }
}
