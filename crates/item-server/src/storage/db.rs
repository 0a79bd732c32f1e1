//! PostgreSQL durable store

use anyhow::{Context, Result};
use async_trait::async_trait;
use item_core::ports::DurableStore;
use item_core::{Item, StoreError};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        tracing::info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        tracing::info!("PostgreSQL connection pool established");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

/// Sort sqlx errors into connection failures, duplicates and everything else
fn store_error(e: sqlx::Error, title: Option<&str>) -> StoreError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Duplicate(title.unwrap_or_default().to_string())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e.to_string()),
        _ => StoreError::Backend(e.to_string()),
    }
}

#[async_trait]
impl DurableStore for Database {
    async fn create_table(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id SERIAL PRIMARY KEY,
                title TEXT UNIQUE NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| store_error(e, None))?;

        Ok(())
    }

    async fn insert_item(&self, title: &str) -> Result<i64, StoreError> {
        let (id,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO items (title) VALUES ($1) RETURNING id
            "#,
        )
        .bind(title)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| store_error(e, Some(title)))?;

        Ok(i64::from(id))
    }

    async fn list_items(&self) -> Result<Vec<Item>, StoreError> {
        let rows: Vec<(i32, String)> = sqlx::query_as(
            r#"
            SELECT id, title FROM items ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| store_error(e, None))?;

        Ok(rows
            .into_iter()
            .map(|(id, title)| Item {
                id: i64::from(id),
                title,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connection_failures() {
        assert!(store_error(sqlx::Error::PoolTimedOut, None).is_connection_failure());
        assert!(store_error(sqlx::Error::PoolClosed, None).is_connection_failure());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(store_error(sqlx::Error::Io(io), None).is_connection_failure());
    }

    #[test]
    fn test_row_errors_are_backend_errors() {
        let err = store_error(sqlx::Error::RowNotFound, Some("x"));
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
