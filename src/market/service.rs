//! Market data aggregator.
//!
//! Tries providers in priority order and returns the first snapshot that has
//! listings. Results are cached per card query for a fixed TTL.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::cache::TtlCache;
use crate::config::Config;
use crate::market::ebay::EbayMarketProvider;
use crate::market::error::MarketDataError;
use crate::market::models::{CardQuery, MarketSnapshot};
use crate::market::provider::{MarketDataProvider, ProviderSelector};
use crate::market::simulated::SimulatedMarketProvider;

/// TTL of cached market snapshots, in seconds.
pub const MARKET_CACHE_TTL: u64 = 15 * 60;

/// Shared handle to the snapshot cache.
pub type SnapshotCache = Arc<RwLock<TtlCache<MarketSnapshot>>>;

#[derive(Clone)]
pub struct MarketDataService {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    cache: SnapshotCache,
    cache_ttl: u64,
}

impl MarketDataService {
    /// Builds a service over an explicit provider chain.
    pub fn new(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        cache: SnapshotCache,
        cache_ttl: u64,
    ) -> Self {
        info!(
            "Market data service initialized with {} providers",
            providers.len()
        );
        Self {
            providers,
            cache,
            cache_ttl,
        }
    }

    /// Builds the standard chain: eBay first when credentials are configured,
    /// the simulated provider always last.
    pub fn from_config(config: &Config, cache: SnapshotCache) -> Result<Self, MarketDataError> {
        let mut providers: Vec<Arc<dyn MarketDataProvider>> = Vec::new();

        let ebay = EbayMarketProvider::new(config.ebay.clone())?;
        if ebay.is_enabled() {
            info!("eBay market provider enabled");
            providers.push(Arc::new(ebay));
        }
        providers.push(Arc::new(SimulatedMarketProvider::new()));

        Ok(Self::new(providers, cache, config.market_cache_ttl))
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.kind().as_str()).collect()
    }

    /// Cache-fronted market lookup.
    ///
    /// The cache key covers the card fields only, so a snapshot cached under
    /// one selector is served to every selector until it expires.
    pub async fn get_market_data(
        &self,
        query: &CardQuery,
        selector: ProviderSelector,
    ) -> MarketSnapshot {
        let key = query.cache_key();

        if let Some(snapshot) = self.cache.write().await.get(&key) {
            debug!("market cache hit: {}", key);
            return snapshot;
        }

        let snapshot = self.fetch_uncached(query, selector).await;
        self.cache
            .write()
            .await
            .set(key, snapshot.clone(), Some(self.cache_ttl));
        snapshot
    }

    /// Walks the provider chain without consulting the cache.
    ///
    /// Provider errors are logged and skipped. When no provider produces
    /// listings the canonical empty snapshot is returned.
    pub async fn fetch_uncached(
        &self,
        query: &CardQuery,
        selector: ProviderSelector,
    ) -> MarketSnapshot {
        for provider in self.providers.iter().filter(|p| selector.matches(p.kind())) {
            let name = provider.kind();
            info!("Fetching market data from {}", name);

            match provider.get_snapshot(query).await {
                Ok(snapshot) if snapshot.has_data() => {
                    info!(
                        "Successfully fetched {} comps from {}",
                        snapshot.listings_count, name
                    );
                    return snapshot;
                }
                Ok(_) => debug!("{} returned no listings", name),
                Err(e) => error!("Provider {} failed: {}", name, e),
            }
        }

        warn!("All market data providers failed");
        MarketSnapshot::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::models::{CompData, Confidence};
    use crate::market::provider::ProviderKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double that counts calls and returns a canned result.
    struct StubProvider {
        kind: ProviderKind,
        result: fn() -> Result<Vec<CompData>, MarketDataError>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(
            kind: ProviderKind,
            result: fn() -> Result<Vec<CompData>, MarketDataError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                kind,
                result,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn fetch_comps(
            &self,
            _query: &CardQuery,
            _limit: usize,
        ) -> Result<Vec<CompData>, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn failing() -> Result<Vec<CompData>, MarketDataError> {
        Err(MarketDataError::Timeout)
    }

    fn empty() -> Result<Vec<CompData>, MarketDataError> {
        Ok(Vec::new())
    }

    fn three_sales() -> Result<Vec<CompData>, MarketDataError> {
        Ok([10.0, 20.0, 30.0]
            .into_iter()
            .map(|price| CompData {
                title: "Stub".to_string(),
                price,
                sold_date: chrono::Utc::now(),
                condition: None,
                grade: None,
                source_url: None,
                source_name: "ebay".to_string(),
            })
            .collect())
    }

    fn new_cache() -> SnapshotCache {
        Arc::new(RwLock::new(TtlCache::new(MARKET_CACHE_TTL)))
    }

    fn service(providers: Vec<Arc<dyn MarketDataProvider>>) -> MarketDataService {
        MarketDataService::new(providers, new_cache(), MARKET_CACHE_TTL)
    }

    fn query() -> CardQuery {
        CardQuery::new("LeBron James", "2003 Topps Chrome").with_year(2003)
    }

    #[tokio::test]
    async fn test_failing_provider_falls_back_to_simulated() {
        let broken = StubProvider::new(ProviderKind::Ebay, failing);
        let providers: Vec<Arc<dyn MarketDataProvider>> =
            vec![broken.clone(), Arc::new(SimulatedMarketProvider::new())];
        let svc = service(providers);

        let snapshot = svc.get_market_data(&query(), ProviderSelector::Auto).await;

        assert_eq!(broken.calls(), 1);
        assert_eq!(snapshot.source_name, "simulated");
        assert!(snapshot.listings_count > 0);
    }

    #[tokio::test]
    async fn test_first_provider_with_data_wins() {
        let primary = StubProvider::new(ProviderKind::Ebay, three_sales);
        let fallback = StubProvider::new(ProviderKind::Simulated, three_sales);
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![primary.clone(), fallback.clone()];
        let svc = service(providers);

        let snapshot = svc.get_market_data(&query(), ProviderSelector::Auto).await;

        assert_eq!(snapshot.source_name, "ebay");
        assert_eq!(snapshot.listings_count, 3);
        assert_eq!(snapshot.average, 20.0);
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_empty_returns_none_snapshot() {
        let a = StubProvider::new(ProviderKind::Ebay, empty);
        let b = StubProvider::new(ProviderKind::Simulated, failing);
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![a.clone(), b.clone()];
        let svc = service(providers);

        let snapshot = svc.get_market_data(&query(), ProviderSelector::Auto).await;

        assert_eq!(snapshot.source_name, "none");
        assert_eq!(snapshot.listings_count, 0);
        assert_eq!(
            (snapshot.floor, snapshot.average, snapshot.ceiling),
            (0.0, 0.0, 0.0)
        );
        assert_eq!(snapshot.confidence, Confidence::Low);
        assert_eq!((a.calls(), b.calls()), (1, 1));
    }

    #[tokio::test]
    async fn test_selector_skips_other_providers() {
        let ebay = StubProvider::new(ProviderKind::Ebay, three_sales);
        let providers: Vec<Arc<dyn MarketDataProvider>> =
            vec![ebay.clone(), Arc::new(SimulatedMarketProvider::new())];
        let svc = service(providers);

        let snapshot = svc
            .get_market_data(&query(), ProviderSelector::Only(ProviderKind::Simulated))
            .await;

        assert_eq!(snapshot.source_name, "simulated");
        assert_eq!(ebay.calls(), 0);
    }

    #[tokio::test]
    async fn test_selector_without_matching_provider() {
        let providers: Vec<Arc<dyn MarketDataProvider>> =
            vec![Arc::new(SimulatedMarketProvider::new())];
        let svc = service(providers);

        let snapshot = svc
            .get_market_data(&query(), ProviderSelector::Only(ProviderKind::Ebay))
            .await;

        assert_eq!(snapshot.source_name, "none");
    }

    #[tokio::test]
    async fn test_second_identical_call_hits_cache() {
        let counting = StubProvider::new(ProviderKind::Simulated, three_sales);
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![counting.clone()];
        let svc = service(providers);

        let first = svc.get_market_data(&query(), ProviderSelector::Auto).await;
        let second = svc.get_market_data(&query(), ProviderSelector::Auto).await;

        assert_eq!(counting.calls(), 1);
        assert_eq!(first, second);

        let stats = svc.cache().read().await.stats();
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_cache_ignores_selector() {
        let counting = StubProvider::new(ProviderKind::Simulated, three_sales);
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![counting.clone()];
        let svc = service(providers);

        svc.get_market_data(&query(), ProviderSelector::Auto).await;
        let cached = svc
            .get_market_data(&query(), ProviderSelector::Only(ProviderKind::Ebay))
            .await;

        assert_eq!(counting.calls(), 1);
        assert_eq!(cached.listings_count, 3);
    }

    #[tokio::test]
    async fn test_empty_results_are_cached() {
        let counting = StubProvider::new(ProviderKind::Simulated, empty);
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![counting.clone()];
        let svc = service(providers);

        svc.get_market_data(&query(), ProviderSelector::Auto).await;
        let snapshot = svc.get_market_data(&query(), ProviderSelector::Auto).await;

        assert_eq!(snapshot.source_name, "none");
        assert_eq!(counting.calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_queries_use_distinct_entries() {
        let counting = StubProvider::new(ProviderKind::Simulated, three_sales);
        let providers: Vec<Arc<dyn MarketDataProvider>> = vec![counting.clone()];
        let svc = service(providers);

        svc.get_market_data(&query(), ProviderSelector::Auto).await;
        svc.get_market_data(&query().with_grade("PSA 9"), ProviderSelector::Auto)
            .await;

        assert_eq!(counting.calls(), 2);
    }

    #[tokio::test]
    async fn test_from_config_without_credentials() {
        let svc = MarketDataService::from_config(&Config::default(), new_cache()).unwrap();
        assert_eq!(svc.provider_names(), vec!["simulated"]);
    }
}
