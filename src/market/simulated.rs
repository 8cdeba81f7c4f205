//! Simulated market provider.
//!
//! Manufactures plausible comps around a grade-dependent base price. It never
//! fails, so it sits last in the provider chain as the guaranteed fallback and
//! doubles as a test provider.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::market::error::MarketDataError;
use crate::market::models::{CardQuery, CompData};
use crate::market::provider::{MarketDataProvider, ProviderKind};
use crate::market::stats::round_cents;

/// Upper bound on comps produced per call.
pub const MAX_SIMULATED_COMPS: usize = 20;

/// Sold dates are spread over this many trailing days.
const HISTORY_DAYS: i64 = 90;

#[derive(Debug, Clone, Default)]
pub struct SimulatedMarketProvider;

impl SimulatedMarketProvider {
    pub fn new() -> Self {
        Self
    }

    /// Base price by grade: gem mint 10s command the most, 9s less, anything
    /// else the default.
    pub fn base_price(grade: Option<&str>) -> f64 {
        match grade {
            Some(g) if g.contains("10") => 250.0,
            Some(g) if g.contains('9') => 140.0,
            _ => 100.0,
        }
    }

    fn generate(query: &CardQuery, count: usize) -> Vec<CompData> {
        // Seeded per card so repeated lookups describe the same market
        let mut rng = StdRng::seed_from_u64(query_seed(query));
        let base = Self::base_price(query.grade.as_deref());
        let title = format!(
            "{} {} {}",
            query.player,
            query.set_name,
            query
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "Vintage".to_string())
        );
        let now = Utc::now();

        (0..count)
            .map(|_| {
                let price = round_cents(base * rng.gen_range(0.8..=1.2));
                let days_ago = rng.gen_range(1..=HISTORY_DAYS);

                CompData {
                    title: title.clone(),
                    price,
                    sold_date: now - Duration::days(days_ago),
                    condition: Some("Used".to_string()),
                    grade: query.grade.clone(),
                    source_url: None,
                    source_name: ProviderKind::Simulated.as_str().to_string(),
                }
            })
            .collect()
    }
}

fn query_seed(query: &CardQuery) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.cache_key().hash(&mut hasher);
    hasher.finish()
}

#[async_trait]
impl MarketDataProvider for SimulatedMarketProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Simulated
    }

    async fn fetch_comps(
        &self,
        query: &CardQuery,
        limit: usize,
    ) -> Result<Vec<CompData>, MarketDataError> {
        Ok(Self::generate(query, limit.min(MAX_SIMULATED_COMPS)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::models::Confidence;

    fn trout() -> CardQuery {
        CardQuery::new("Mike Trout", "2011 Topps Update")
            .with_year(2011)
            .with_grade("PSA 10")
    }

    #[tokio::test]
    async fn test_fetch_comps() {
        let provider = SimulatedMarketProvider::new();

        let comps = provider.fetch_comps(&trout(), 20).await.unwrap();

        assert_eq!(comps.len(), 20);
        assert!(comps.iter().all(|c| c.source_name == "simulated"));
        assert!(comps.iter().all(|c| c.price > 0.0));
        assert!(comps.iter().all(|c| c.grade.as_deref() == Some("PSA 10")));
    }

    #[tokio::test]
    async fn test_fetch_comps_respects_limit() {
        let provider = SimulatedMarketProvider::new();

        assert_eq!(provider.fetch_comps(&trout(), 5).await.unwrap().len(), 5);
        assert_eq!(provider.fetch_comps(&trout(), 500).await.unwrap().len(), 20);
        assert!(provider.fetch_comps(&trout(), 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prices_within_grade_band() {
        let provider = SimulatedMarketProvider::new();

        let comps = provider.fetch_comps(&trout(), 20).await.unwrap();
        assert!(comps.iter().all(|c| (200.0..=300.0).contains(&c.price)));

        let raw = CardQuery::new("Mike Trout", "2011 Topps Update");
        let comps = provider.fetch_comps(&raw, 20).await.unwrap();
        assert!(comps.iter().all(|c| (80.0..=120.0).contains(&c.price)));
    }

    #[tokio::test]
    async fn test_sold_dates_in_trailing_window() {
        let provider = SimulatedMarketProvider::new();
        let now = Utc::now();

        let comps = provider.fetch_comps(&trout(), 20).await.unwrap();
        for comp in comps {
            let age = now - comp.sold_date;
            assert!(age >= Duration::hours(23));
            assert!(age <= Duration::days(HISTORY_DAYS + 1));
        }
    }

    #[tokio::test]
    async fn test_same_card_same_prices() {
        let provider = SimulatedMarketProvider::new();

        let first: Vec<f64> = provider
            .fetch_comps(&trout(), 20)
            .await
            .unwrap()
            .iter()
            .map(|c| c.price)
            .collect();
        let second: Vec<f64> = provider
            .fetch_comps(&trout(), 20)
            .await
            .unwrap()
            .iter()
            .map(|c| c.price)
            .collect();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_snapshot() {
        let provider = SimulatedMarketProvider::new();
        let query = CardQuery::new("Shohei Ohtani", "2018 Topps Chrome")
            .with_year(2018)
            .with_grade("PSA 9");

        let snapshot = provider.get_snapshot(&query).await.unwrap();

        assert_eq!(snapshot.source_name, "simulated");
        assert_eq!(snapshot.listings_count, 20);
        assert_eq!(snapshot.comps.len(), 20);
        assert_eq!(snapshot.confidence, Confidence::Medium);
        assert!(snapshot.floor <= snapshot.average);
        assert!(snapshot.average <= snapshot.ceiling);
    }

    #[test]
    fn test_base_price() {
        assert_eq!(SimulatedMarketProvider::base_price(Some("PSA 10")), 250.0);
        assert_eq!(SimulatedMarketProvider::base_price(Some("BGS 9.5")), 140.0);
        assert_eq!(SimulatedMarketProvider::base_price(Some("SGC 8")), 100.0);
        assert_eq!(SimulatedMarketProvider::base_price(None), 100.0);
    }

    #[test]
    fn test_vintage_title_without_year() {
        let query = CardQuery::new("Mickey Mantle", "1952 Topps");
        let comps = SimulatedMarketProvider::generate(&query, 1);

        assert_eq!(comps[0].title, "Mickey Mantle 1952 Topps Vintage");
    }
}
