//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses and current size.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of entries in the cache (expired ones included until observed)
    pub size: usize,
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// hits + misses
    pub total: u64,
    /// hits / total * 100, rounded to two decimals
    pub hit_rate_percent: f64,
}

impl CacheStats {
    // == Constructor ==
    /// Builds a stats snapshot from raw counters.
    pub fn new(size: usize, hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        Self {
            size,
            hits,
            misses,
            total,
            hit_rate_percent: hit_rate_percent(hits, total),
        }
    }
}

// == Hit Rate ==
/// Calculates the hit rate as a percentage with two decimals, or 0.0 if no
/// requests have been made.
fn hit_rate_percent(hits: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = hits as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
