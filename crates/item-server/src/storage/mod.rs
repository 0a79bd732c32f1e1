//! Storage layer
//!
//! PostgreSQL is the durable store. Redis holds the title cache, with a
//! DashMap-backed cache as the single-node alternative. Elasticsearch is the
//! search index.

pub mod db;
pub mod memory;
pub mod redis_cache;
pub mod search;

pub use db::Database;
pub use memory::MemoryTitleCache;
pub use redis_cache::RedisTitleCache;
pub use search::ElasticIndex;
