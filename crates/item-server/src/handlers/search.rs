//! Search handler

use crate::AppState;
use axum::{extract::State, Json};
use item_core::{SearchHit, SearchRequest};

/// Always answers 200; a failing index reads as no matches
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Json<Vec<SearchHit>> {
    Json(state.coordinator.search_items(&req.search_text).await)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{post, Stores};
    use axum::http::StatusCode;
    use item_core::testing::connection_dropped;
    use serde_json::json;

    #[tokio::test]
    async fn test_search_returns_raw_hits() {
        let stores = Stores::new();
        post(stores.app(), "/items", json!({ "title": "buy milk" })).await;
        post(stores.app(), "/items", json!({ "title": "walk dog" })).await;

        let (status, body) = post(stores.app(), "/search", json!({ "searchText": "milk" })).await;

        assert_eq!(status, StatusCode::OK);
        let hits = body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["_source"], json!({ "text": "buy milk" }));
    }

    #[tokio::test]
    async fn test_search_failure_looks_like_no_matches() {
        let stores = Stores::new();
        post(stores.app(), "/items", json!({ "title": "buy milk" })).await;
        stores.index.query_fault.set(connection_dropped());

        let (status, body) = post(stores.app(), "/search", json!({ "searchText": "milk" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
