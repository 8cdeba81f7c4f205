//! Response DTOs for the market API
//!
//! Defines the structure of outgoing HTTP response bodies. Market snapshots and
//! cache statistics are serialized directly from their domain types.

use serde::Serialize;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Market providers in priority order
    pub providers: Vec<String>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(providers: Vec<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            providers,
        }
    }
}

/// Response body for the rate limit endpoint (GET /rate-limit)
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitResponse {
    /// Identity the caller is governed under
    pub client_id: String,
    pub remaining: u32,
    pub max_requests: u32,
    pub window_seconds: u64,
}

/// Response body for POST /cache/cleanup
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    /// Number of expired entries removed
    pub removed: usize,
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Entries dropped by the clear
    pub cleared: usize,
}

impl ClearResponse {
    pub fn new(cleared: usize) -> Self {
        Self {
            message: format!("Cache cleared, {} entries removed", cleared),
            cleared,
        }
    }
}
