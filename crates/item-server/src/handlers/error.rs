//! Mapping of coordinator errors to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use item_core::{CoordinatorError, TitleError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid title: {0}")]
    InvalidTitle(#[from] TitleError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidTitle(_) => StatusCode::BAD_REQUEST,
            ApiError::Coordinator(e) if e.is_duplicate() => StatusCode::CONFLICT,
            ApiError::Coordinator(CoordinatorError::CreateFailed { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Coordinator(CoordinatorError::StoreUnavailable { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
