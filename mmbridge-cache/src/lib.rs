//! TTL cache for mmbridge records.
//!
//! Per-entity in-memory maps with lazy expiry and secondary name indices for
//! teams and channels.

mod cache;
mod entry;

pub use cache::{CacheConfig, CacheStats, EntityCache};
