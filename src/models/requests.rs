//! Request DTOs for the market API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::market::{CardQuery, ProviderSelector};

/// Request body for a market lookup (POST /market)
///
/// # Fields
/// - `player`, `set_name`: required card identity
/// - `year`: optional print year
/// - `grade`: optional grade, also accepted as `grade_estimate`
/// - `provider`: `auto` (default), `ebay` or `simulated`
#[derive(Debug, Clone, Deserialize)]
pub struct MarketRequest {
    pub player: String,
    pub set_name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default, alias = "grade_estimate")]
    pub grade: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

impl MarketRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.player.trim().is_empty() {
            return Some("player cannot be empty".to_string());
        }
        if self.set_name.trim().is_empty() {
            return Some("set_name cannot be empty".to_string());
        }
        None
    }

    pub fn selector(&self) -> Result<ProviderSelector, String> {
        self.provider
            .as_deref()
            .map(|p| p.parse::<ProviderSelector>())
            .unwrap_or(Ok(ProviderSelector::Auto))
    }

    pub fn to_query(&self) -> CardQuery {
        CardQuery {
            player: self.player.trim().to_string(),
            set_name: self.set_name.trim().to_string(),
            year: self.year,
            grade: self
                .grade
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
        }
    }
}
