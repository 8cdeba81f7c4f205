//! Snapshot statistics shared by every provider.

use chrono::Utc;

use crate::market::models::{CompData, Confidence, MarketSnapshot, DEFAULT_CURRENCY};

/// Number of comps carried in a snapshot payload.
pub const SNAPSHOT_COMPS_LIMIT: usize = 20;

/// Builds a snapshot from the full set of fetched comps.
///
/// Statistics use every positive price: `floor` is the element at index
/// `floor(n * 0.1)` of the ascending prices, `ceiling` the one at
/// `floor(n * 0.9)`, `average` the mean, each rounded to cents. The band is
/// widened to include the mean when outliers push it outside. Only the first
/// [`SNAPSHOT_COMPS_LIMIT`] comps are kept in the payload, after the
/// statistics are computed.
pub fn build_snapshot(source_name: &str, mut comps: Vec<CompData>) -> MarketSnapshot {
    if comps.is_empty() {
        return MarketSnapshot::empty(source_name);
    }

    let mut prices: Vec<f64> = comps
        .iter()
        .map(|comp| comp.price)
        .filter(|price| *price > 0.0)
        .collect();

    let listings_count = comps.len();
    comps.truncate(SNAPSHOT_COMPS_LIMIT);

    if prices.is_empty() {
        return MarketSnapshot {
            listings_count,
            comps,
            ..MarketSnapshot::empty(source_name)
        };
    }

    prices.sort_by(f64::total_cmp);
    let n = prices.len();
    let average = prices.iter().sum::<f64>() / n as f64;
    // A heavy tail can pull the mean outside the percentile band; clamping
    // keeps floor <= average <= ceiling for any input
    let floor = prices[(n as f64 * 0.1) as usize].min(average);
    let ceiling = prices[(n as f64 * 0.9) as usize].max(average);

    MarketSnapshot {
        source_name: source_name.to_string(),
        currency: DEFAULT_CURRENCY.to_string(),
        floor: round_cents(floor),
        average: round_cents(average),
        ceiling: round_cents(ceiling),
        listings_count,
        comps,
        last_updated: Utc::now(),
        confidence: Confidence::from_listings(listings_count),
    }
}

/// Rounds to cents, ties to even.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
