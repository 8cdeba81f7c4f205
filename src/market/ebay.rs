//! eBay sold-listings provider.
//!
//! ### Upstream
//!
//! - **Auth**: OAuth client-credentials grant against the identity endpoint.
//!   The bearer token is shared by every request and reused until five minutes
//!   before its stated expiry.
//! - **Search**: `findCompletedItems` on the Finding service, sold fixed-price
//!   listings only, most recently ended first.
//! - **Parsing**: the Finding service wraps every field in a one-element array.
//!   Items are read field by field; an item that cannot be read is logged and
//!   skipped without failing the fetch.
//!
//! Without credentials the provider is disabled and reports zero comps.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::market::error::MarketDataError;
use crate::market::models::{CardQuery, CompData};
use crate::market::provider::{MarketDataProvider, ProviderKind};

pub const DEFAULT_FINDING_URL: &str = "https://svcs.ebay.com/services/search/FindingService/v1";
pub const DEFAULT_AUTH_URL: &str = "https://api.ebay.com/identity/v1/oauth2/token";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const OAUTH_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";

/// Tokens are refreshed this long before their stated expiry.
const TOKEN_SAFETY_MARGIN_SECS: u64 = 300;

/// Page size cap of the Finding service.
const MAX_ENTRIES_PER_PAGE: usize = 100;

/// Grading companies whose grade strings are passed to the search verbatim.
const GRADING_COMPANIES: [&str; 5] = ["PSA", "BGS", "SGC", "CGC", "BVG"];

// == Configuration ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EbayCredentials {
    /// Client id (eBay "App ID")
    pub app_id: String,
    /// Client secret (eBay "Cert ID")
    pub cert_id: String,
}

#[derive(Debug, Clone)]
pub struct EbayConfig {
    /// `None` disables the provider
    pub credentials: Option<EbayCredentials>,
    pub finding_url: String,
    pub auth_url: String,
    pub timeout: Duration,
}

impl Default for EbayConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            finding_url: DEFAULT_FINDING_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// == Token Cache ==
#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    7200
}

// == Provider ==
#[derive(Debug)]
pub struct EbayMarketProvider {
    http: reqwest::Client,
    config: EbayConfig,
    token: Mutex<Option<AccessToken>>,
}

impl EbayMarketProvider {
    pub fn new(config: EbayConfig) -> Result<Self, MarketDataError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MarketDataError::Network)?;

        if config.credentials.is_none() {
            warn!("eBay credentials not configured, eBay provider disabled");
        }

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.credentials.is_some()
    }

    /// Returns the cached bearer token, fetching a new one when it is missing
    /// or inside the safety margin.
    async fn access_token(&self, credentials: &EbayCredentials) -> Result<String, MarketDataError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        debug!("requesting eBay access token");
        let response = self
            .http
            .post(&self.config.auth_url)
            .basic_auth(&credentials.app_id, Some(&credentials.cert_id))
            .form(&[("grant_type", "client_credentials"), ("scope", OAUTH_SCOPE)])
            .send()
            .await
            .map_err(MarketDataError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Auth(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let bytes = response.bytes().await.map_err(MarketDataError::from_transport)?;
        let token: TokenResponse =
            serde_json::from_slice(&bytes).map_err(|e| MarketDataError::Parse(e.to_string()))?;

        let lifetime = token.expires_in.saturating_sub(TOKEN_SAFETY_MARGIN_SECS);
        *cached = Some(AccessToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(token.access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }
}

#[async_trait]
impl MarketDataProvider for EbayMarketProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ebay
    }

    async fn fetch_comps(
        &self,
        query: &CardQuery,
        limit: usize,
    ) -> Result<Vec<CompData>, MarketDataError> {
        let Some(credentials) = self.config.credentials.as_ref() else {
            warn!("eBay provider not enabled, returning no comps");
            return Ok(Vec::new());
        };

        let keywords = build_search_query(query);
        info!("eBay search query: {}", keywords);

        let token = self.access_token(credentials).await?;
        let params: Vec<(&str, String)> = vec![
            ("OPERATION-NAME", "findCompletedItems".to_string()),
            ("SERVICE-VERSION", "1.0.0".to_string()),
            ("SECURITY-APPNAME", credentials.app_id.clone()),
            ("RESPONSE-DATA-FORMAT", "JSON".to_string()),
            ("REST-PAYLOAD", String::new()),
            ("keywords", keywords),
            ("itemFilter(0).name", "SoldItemsOnly".to_string()),
            ("itemFilter(0).value", "true".to_string()),
            ("itemFilter(1).name", "ListingType".to_string()),
            ("itemFilter(1).value", "FixedPrice".to_string()),
            ("sortOrder", "EndTimeSoonest".to_string()),
            (
                "paginationInput.entriesPerPage",
                limit.min(MAX_ENTRIES_PER_PAGE).to_string(),
            ),
        ];

        let response = self
            .http
            .get(&self.config.finding_url)
            .bearer_auth(&token)
            .query(&params)
            .send()
            .await
            .map_err(MarketDataError::from_transport)?;

        let status = response.status();
        if status == 401 || status == 403 {
            self.invalidate_token().await;
            return Err(MarketDataError::Auth(format!("search rejected with HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(MarketDataError::Http {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(MarketDataError::from_transport)?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|e| MarketDataError::Parse(e.to_string()))?;

        let mut comps = parse_completed_items(&body, query.grade.as_deref());
        comps.truncate(limit);
        info!("Fetched {} comps from eBay", comps.len());
        Ok(comps)
    }
}

// == Query Building ==
/// Joins player, set, year and a normalized grade into search keywords.
///
/// A grade naming a known grading company is kept as is, a bare number
/// becomes `"PSA <n>"`, anything else is left out.
pub fn build_search_query(query: &CardQuery) -> String {
    let mut parts = vec![query.player.trim().to_string(), query.set_name.trim().to_string()];

    if let Some(year) = query.year {
        parts.push(year.to_string());
    }

    if let Some(grade) = query.grade.as_deref().map(str::trim) {
        let upper = grade.to_ascii_uppercase();
        if GRADING_COMPANIES.iter().any(|company| upper.contains(company)) {
            parts.push(grade.to_string());
        } else if !grade.is_empty() && grade.chars().all(|c| c.is_ascii_digit()) {
            parts.push(format!("PSA {}", grade));
        } else {
            debug!("dropping unrecognized grade '{}' from search", grade);
        }
    }

    parts.retain(|part| !part.is_empty());
    parts.join(" ")
}

// == Response Parsing ==
/// Extracts comps from a `findCompletedItems` response body, skipping any item
/// that cannot be read.
fn parse_completed_items(body: &Value, grade: Option<&str>) -> Vec<CompData> {
    let items = first(body, "findCompletedItemsResponse")
        .and_then(|r| first(r, "searchResult"))
        .and_then(|r| r.get("item"))
        .and_then(Value::as_array);

    let Some(items) = items else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match parse_item(item, grade) {
            Ok(comp) => Some(comp),
            Err(reason) => {
                warn!("Failed to parse eBay item: {}", reason);
                None
            }
        })
        .collect()
}

fn parse_item(item: &Value, grade: Option<&str>) -> Result<CompData, String> {
    let price_value = first(item, "sellingStatus")
        .and_then(|s| first(s, "convertedCurrentPrice"))
        .and_then(|p| p.get("__value__"))
        .ok_or("missing price")?;
    let price = match price_value {
        Value::String(s) => s.parse::<f64>().map_err(|e| format!("bad price '{}': {}", s, e))?,
        other => other.as_f64().ok_or("price is not a number")?,
    };
    if !price.is_finite() || price <= 0.0 {
        return Err(format!("non-positive price {}", price));
    }

    let sold_date = match first(item, "listingInfo").and_then(|l| first_str(l, "endTime")) {
        Some(end_time) => DateTime::parse_from_rfc3339(end_time)
            .map_err(|e| format!("bad end time '{}': {}", end_time, e))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let title = first_str(item, "title").unwrap_or("Unknown").to_string();
    let source_url = first_str(item, "viewItemURL").map(str::to_string);
    let condition = first(item, "condition")
        .and_then(|c| first_str(c, "conditionDisplayName"))
        .map(str::to_string);

    Ok(CompData {
        title,
        price,
        sold_date,
        condition,
        grade: grade.map(str::to_string),
        source_url,
        source_name: ProviderKind::Ebay.as_str().to_string(),
    })
}

/// First element of the array stored under `key`.
fn first<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key)?.as_array()?.first()
}

fn first_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    first(value, key)?.as_str()
}
