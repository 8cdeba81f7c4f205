//! Cache Module
//!
//! Provides a generic in-memory cache with per-entry TTL expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::CacheStats;
pub use store::TtlCache;
