//! Port traits (interfaces) for dependency injection

pub mod search;
pub mod storage;

pub use search::SearchIndex;
pub use storage::{DurableStore, TitleCache};
