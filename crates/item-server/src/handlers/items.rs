//! Item handlers

use super::ApiError;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use item_core::{CreateItemRequest, ItemSummary, ItemTitle};
use tracing::info;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    let items = state.coordinator.list_items().await?;
    Ok(Json(items))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ItemSummary>), ApiError> {
    let title = ItemTitle::parse(req.title)?;
    info!("Create item request: {:?}", title.as_str());

    let accepted = state.coordinator.create_item(&title).await?;
    Ok((StatusCode::CREATED, Json(ItemSummary::from(accepted))))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{get, post, Stores};
    use axum::http::StatusCode;
    use item_core::testing::connection_dropped;
    use item_core::DEFAULT_CACHE_KEY;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_list() {
        let stores = Stores::new();

        let (status, body) = post(stores.app(), "/items", json!({ "title": "buy milk" })).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({ "title": "buy milk" }));

        let (status, body) = get(stores.app(), "/items").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{ "title": "buy milk" }]));
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let stores = Stores::new();
        post(stores.app(), "/items", json!({ "title": "buy milk" })).await;

        let (status, body) = post(stores.app(), "/items", json!({ "title": "buy milk" })).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("duplicate"));
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let stores = Stores::new();

        let (status, _) = post(stores.app(), "/items", json!({ "title": "  " })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(stores.durable.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_hides_cache_failure() {
        let stores = Stores::new();
        stores.cache.write_fault.set(connection_dropped());

        let (status, _) = post(stores.app(), "/items", json!({ "title": "y" })).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(stores.cache.members(DEFAULT_CACHE_KEY).is_empty());

        stores.cache.write_fault.clear();
        let (_, body) = get(stores.app(), "/items").await;
        assert_eq!(body, json!([{ "title": "y" }]));
    }

    #[tokio::test]
    async fn test_list_unavailable_when_cache_is_down() {
        let stores = Stores::new();
        stores.cache.read_fault.set(connection_dropped());

        let (status, body) = get(stores.app(), "/items").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_create_fails_when_durable_store_is_down() {
        let stores = Stores::new();
        stores.durable.insert_fault.set(connection_dropped());

        let (status, _) = post(stores.app(), "/items", json!({ "title": "x" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stores.cache.add_calls(), 0);
    }
}
