//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{CacheStats, TtlCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::market::{MarketDataError, MarketDataService, MarketSnapshot};
use crate::models::{
    CleanupResponse, ClearResponse, HealthResponse, MarketRequest, RateLimitResponse,
};
use crate::ratelimit::{resolve_client_id, RateGovernor};

/// Application state shared across all handlers.
///
/// The snapshot cache lives inside the market service; the governor is shared
/// with the rate limit middleware.
#[derive(Clone)]
pub struct AppState {
    pub market: MarketDataService,
    pub governor: Arc<RwLock<RateGovernor>>,
    /// CORS origin; any origin when `None`
    pub allowed_origin: Option<String>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(market: MarketDataService, governor: RateGovernor) -> Self {
        Self {
            market,
            governor: Arc::new(RwLock::new(governor)),
            allowed_origin: None,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the snapshot cache, the provider chain and the governor.
    pub fn from_config(config: &Config) -> std::result::Result<Self, MarketDataError> {
        let cache = Arc::new(RwLock::new(TtlCache::new(config.market_cache_ttl)));
        let market = MarketDataService::from_config(config, cache)?;
        let governor = RateGovernor::new(
            config.rate_limit_max_requests,
            config.rate_limit_window_secs,
        );

        Ok(Self {
            allowed_origin: config.allowed_origin.clone(),
            ..Self::new(market, governor)
        })
    }
}

/// Handler for POST /market
///
/// Looks up a market snapshot for the requested card. Governed by the rate
/// limit middleware.
pub async fn market_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<MarketRequest>, JsonRejection>,
) -> Result<Json<MarketSnapshot>> {
    let Json(req) = payload?;
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }
    let selector = req.selector().map_err(ApiError::InvalidRequest)?;

    let snapshot = state.market.get_market_data(&req.to_query(), selector).await;
    Ok(Json(snapshot))
}

/// Handler for GET /rate-limit
///
/// Reports the caller's remaining budget without consuming any of it.
pub async fn rate_limit_handler(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Json<RateLimitResponse> {
    let client_id = resolve_client_id(&headers, peer.map(|ConnectInfo(addr)| addr));
    let governor = state.governor.read().await;

    Json(RateLimitResponse {
        remaining: governor.get_remaining(&client_id),
        max_requests: governor.max_requests(),
        window_seconds: governor.window_seconds(),
        client_id,
    })
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    let cache = state.market.cache().read().await;
    Json(cache.stats())
}

/// Handler for POST /cache/cleanup
///
/// Evicts every expired snapshot immediately.
pub async fn cache_cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let removed = state.market.cache().write().await.cleanup();
    info!("Manual cache cleanup removed {} entries", removed);
    Json(CleanupResponse { removed })
}

/// Handler for DELETE /cache
///
/// Drops all snapshots and resets the hit/miss counters.
pub async fn cache_clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.market.cache().write().await;
    let cleared = cache.len();
    cache.clear();
    info!("Market cache cleared ({} entries)", cleared);
    Json(ClearResponse::new(cleared))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let providers = state
        .market
        .provider_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(HealthResponse::healthy(providers))
}
