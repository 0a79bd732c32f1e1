//! Elasticsearch index over its REST API

use anyhow::{Context, Result};
use async_trait::async_trait;
use item_core::ports::SearchIndex;
use item_core::{IndexedDocument, SearchHit, StoreError, TEXT_FIELD};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub struct ElasticIndex {
    client: Client,
    base_url: String,
    /// Wait for a refresh on every write so new documents are searchable at once
    refresh: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<SearchHit>,
}

impl ElasticIndex {
    pub fn new(base_url: &str, refresh: bool, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build search client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            refresh,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Index settings declaring the single text field
pub fn index_mapping() -> serde_json::Value {
    json!({
        "mappings": {
            "properties": {
                TEXT_FIELD: { "type": "text" }
            }
        }
    })
}

fn transport_error(e: reqwest::Error) -> StoreError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Backend(e.to_string())
    }
}

async fn error_body(response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    StoreError::Backend(format!("{}: {}", status, body))
}

async fn check(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_body(response).await)
    }
}

fn parse_hits(body: &[u8]) -> Result<Vec<SearchHit>, StoreError> {
    let response: SearchResponse = serde_json::from_slice(body)
        .map_err(|e| StoreError::Backend(format!("Malformed search response: {}", e)))?;
    Ok(response.hits.hits)
}

#[async_trait]
impl SearchIndex for ElasticIndex {
    async fn ensure_index(&self, name: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .head(self.url(name))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            status if status.is_success() => {
                tracing::info!("Search index '{}' already exists", name);
                return Ok(());
            }
            StatusCode::NOT_FOUND => {}
            _ => return Err(error_body(response).await),
        }

        tracing::info!("Creating search index '{}'", name);
        let response = self
            .client
            .put(self.url(name))
            .json(&index_mapping())
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::BAD_REQUEST {
            // Another process created it between HEAD and PUT
            let body = response.text().await.unwrap_or_default();
            if body.contains("resource_already_exists_exception") {
                return Ok(());
            }
            return Err(StoreError::Backend(format!("400 Bad Request: {}", body)));
        }
        check(response).await?;

        Ok(())
    }

    async fn index_document(
        &self,
        name: &str,
        document: &IndexedDocument,
    ) -> Result<(), StoreError> {
        let mut request = self.client.post(self.url(&format!("{}/_doc", name)));
        if self.refresh {
            request = request.query(&[("refresh", "wait_for")]);
        }

        let response = request
            .json(document)
            .send()
            .await
            .map_err(transport_error)?;
        check(response).await?;

        Ok(())
    }

    async fn match_query(
        &self,
        name: &str,
        field: &str,
        text: &str,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let query = json!({
            "query": {
                "match": { field: text }
            }
        });

        let response = self
            .client
            .post(self.url(&format!("{}/_search", name)))
            .json(&query)
            .send()
            .await
            .map_err(transport_error)?;
        let body = check(response)
            .await?
            .bytes()
            .await
            .map_err(transport_error)?;

        parse_hits(&body)
    }
}
