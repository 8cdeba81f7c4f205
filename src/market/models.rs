//! Market data types: the card query, single comparable sales and the
//! aggregated snapshot returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source name of the snapshot returned when no provider produced data.
pub const NO_SOURCE: &str = "none";

pub const DEFAULT_CURRENCY: &str = "USD";

// == Card Query ==
/// Identifies the card being valued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardQuery {
    pub player: String,
    pub set_name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub grade: Option<String>,
}

impl CardQuery {
    pub fn new(player: impl Into<String>, set_name: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            set_name: set_name.into(),
            year: None,
            grade: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.grade = Some(grade.into());
        self
    }

    /// Cache key derived from the normalized query fields.
    ///
    /// Case and surrounding whitespace are ignored so that equivalent requests
    /// share an entry.
    pub fn cache_key(&self) -> String {
        fn norm(s: &str) -> String {
            s.trim().to_lowercase()
        }

        format!(
            "market:{}|{}|{}|{}",
            norm(&self.player),
            norm(&self.set_name),
            self.year.map(|y| y.to_string()).unwrap_or_default(),
            self.grade.as_deref().map(norm).unwrap_or_default(),
        )
    }
}

// == Comparable Sale ==
/// A single completed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompData {
    pub title: String,
    pub price: f64,
    pub sold_date: DateTime<Utc>,
    pub condition: Option<String>,
    pub grade: Option<String>,
    #[serde(rename = "url")]
    pub source_url: Option<String>,
    #[serde(rename = "source")]
    pub source_name: String,
}

// == Confidence ==
/// How much the snapshot statistics can be trusted, by sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// `high` from 30 listings, `medium` from 10, `low` below that.
    pub fn from_listings(count: usize) -> Self {
        match count {
            n if n >= 30 => Self::High,
            n if n >= 10 => Self::Medium,
            _ => Self::Low,
        }
    }
}

// == Market Snapshot ==
/// Aggregated valuation for one card query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(rename = "source")]
    pub source_name: String,
    pub currency: String,
    pub floor: f64,
    pub average: f64,
    pub ceiling: f64,
    pub listings_count: usize,
    pub comps: Vec<CompData>,
    pub last_updated: DateTime<Utc>,
    pub confidence: Confidence,
}

impl MarketSnapshot {
    /// A zeroed snapshot attributed to `source_name`.
    pub fn empty(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            floor: 0.0,
            average: 0.0,
            ceiling: 0.0,
            listings_count: 0,
            comps: Vec::new(),
            last_updated: Utc::now(),
            confidence: Confidence::Low,
        }
    }

    /// Returned by the aggregator when every provider came back empty.
    pub fn none() -> Self {
        Self::empty(NO_SOURCE)
    }

    pub fn has_data(&self) -> bool {
        self.listings_count > 0
    }
}
