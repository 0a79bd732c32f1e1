//! HTTP handlers

pub mod error;
pub mod health;
pub mod items;
pub mod search;

pub use error::ApiError;
pub use health::health;
