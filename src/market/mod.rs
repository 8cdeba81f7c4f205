//! Market Data Module
//!
//! Provider abstraction, comparable-sale statistics and the cache-fronted
//! aggregator.
//!
//! # Providers
//! - `ebay` - sold listings from the eBay Finding service
//! - `simulated` - manufactured comps, always available as the last fallback

mod ebay;
mod error;
mod models;
mod provider;
mod service;
mod simulated;
mod stats;

pub use ebay::{EbayConfig, EbayCredentials, EbayMarketProvider};
pub use error::MarketDataError;
pub use models::{CardQuery, CompData, Confidence, MarketSnapshot, NO_SOURCE};
pub use provider::{MarketDataProvider, ProviderKind, ProviderSelector, SNAPSHOT_FETCH_LIMIT};
pub use service::{MarketDataService, SnapshotCache, MARKET_CACHE_TTL};
pub use simulated::SimulatedMarketProvider;
pub use stats::{build_snapshot, SNAPSHOT_COMPS_LIMIT};
