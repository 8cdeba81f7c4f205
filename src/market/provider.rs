//! Provider contract and the tags providers are selected by.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::market::error::MarketDataError;
use crate::market::models::{CardQuery, CompData, MarketSnapshot};
use crate::market::stats::build_snapshot;

/// Number of comps requested when building a snapshot.
pub const SNAPSHOT_FETCH_LIMIT: usize = 50;

// == Provider Kind ==
/// Registered provider tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Ebay,
    Simulated,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ebay => "ebay",
            Self::Simulated => "simulated",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Provider Selector ==
/// Which providers a request may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderSelector {
    /// Every configured provider, in priority order
    #[default]
    Auto,
    Only(ProviderKind),
}

impl ProviderSelector {
    pub fn matches(&self, kind: ProviderKind) -> bool {
        match self {
            Self::Auto => true,
            Self::Only(selected) => *selected == kind,
        }
    }
}

impl FromStr for ProviderSelector {
    type Err = String;

    /// Exact, case-insensitive tag match: `auto`, `ebay` or `simulated`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "ebay" => Ok(Self::Only(ProviderKind::Ebay)),
            "simulated" => Ok(Self::Only(ProviderKind::Simulated)),
            other => Err(format!(
                "Unknown provider '{}', expected one of: auto, ebay, simulated",
                other
            )),
        }
    }
}

// == Provider Trait ==
/// A source of comparable sales.
///
/// `fetch_comps` returns an empty list when nothing matched; errors are
/// reserved for transport or authentication failures.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn fetch_comps(
        &self,
        query: &CardQuery,
        limit: usize,
    ) -> Result<Vec<CompData>, MarketDataError>;

    async fn get_snapshot(&self, query: &CardQuery) -> Result<MarketSnapshot, MarketDataError> {
        let comps = self.fetch_comps(query, SNAPSHOT_FETCH_LIMIT).await?;
        Ok(build_snapshot(self.kind().as_str(), comps))
    }
}
