//! Provider error types.

use thiserror::Error;

/// Failure of a single market data provider call.
///
/// The aggregator logs these and moves on to the next provider; they never
/// reach an HTTP caller.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("upstream returned HTTP {status}")]
    Http { status: u16 },

    #[error("failed to parse upstream response: {0}")]
    Parse(String),
}

impl MarketDataError {
    /// Maps a reqwest error, separating timeouts from other transport failures.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }
}
