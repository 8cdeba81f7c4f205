//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::market::{EbayConfig, EbayCredentials, MARKET_CACHE_TTL};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// TTL in seconds for cached market snapshots
    pub market_cache_ttl: u64,
    /// Admissions per client per window on governed routes
    pub rate_limit_max_requests: u32,
    /// Rate limit window length in seconds
    pub rate_limit_window_secs: u64,
    /// CORS origin; any origin when unset
    pub allowed_origin: Option<String>,
    /// eBay provider settings
    pub ebay: EbayConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `MARKET_CACHE_TTL` - Snapshot cache TTL in seconds (default: 900)
    /// - `RATE_LIMIT_MAX_REQUESTS` - Requests per window (default: 10)
    /// - `RATE_LIMIT_WINDOW_SECONDS` - Window length in seconds (default: 60)
    /// - `ALLOWED_ORIGIN` - CORS origin (default: any)
    /// - `EBAY_APP_ID` / `EBAY_CERT_ID` - eBay client credentials; both
    ///   required to enable the eBay provider
    /// - `EBAY_FINDING_URL` / `EBAY_AUTH_URL` - endpoint overrides
    /// - `EBAY_TIMEOUT_SECS` - upstream request timeout (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let credentials = match (non_empty_var("EBAY_APP_ID"), non_empty_var("EBAY_CERT_ID")) {
            (Some(app_id), Some(cert_id)) => Some(EbayCredentials { app_id, cert_id }),
            _ => None,
        };

        let ebay = EbayConfig {
            credentials,
            finding_url: non_empty_var("EBAY_FINDING_URL").unwrap_or(defaults.ebay.finding_url),
            auth_url: non_empty_var("EBAY_AUTH_URL").unwrap_or(defaults.ebay.auth_url),
            timeout: parse_var("EBAY_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.ebay.timeout),
        };

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            market_cache_ttl: parse_var("MARKET_CACHE_TTL").unwrap_or(defaults.market_cache_ttl),
            rate_limit_max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or(defaults.rate_limit_max_requests),
            rate_limit_window_secs: parse_var("RATE_LIMIT_WINDOW_SECONDS")
                .unwrap_or(defaults.rate_limit_window_secs),
            allowed_origin: non_empty_var("ALLOWED_ORIGIN"),
            ebay,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 60,
            market_cache_ttl: MARKET_CACHE_TTL,
            rate_limit_max_requests: 10,
            rate_limit_window_secs: 60,
            allowed_origin: None,
            ebay: EbayConfig::default(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    non_empty_var(name).and_then(|v| v.parse().ok())
}
