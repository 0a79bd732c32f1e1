//! Item Types - Pure type definitions
//!
//! Data types shared by the coordinator and the HTTP service. No async
//! runtime dependencies live here.

pub mod item;
pub mod search;

pub use item::*;
pub use search::*;
