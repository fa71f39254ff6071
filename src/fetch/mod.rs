//! Multi-source minute-bar fetcher with prioritized per-market fallback.

pub mod client;
pub mod error;
pub mod sources;
pub mod symbol_transform;

pub use error::FetchError;

use chrono_tz::Tz;

use crate::store::Sample;
use crate::symbol::{MarketKind, Symbol};
use client::{with_retry, HttpClient};

pub struct Fetcher {
    client: HttpClient,
}

impl Fetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: HttpClient::new(),
        }
    }

    /// Walks the market's source chain in order, retrying each source up
    /// to `MAX_RETRIES` times before moving to the next. Returns the first
    /// non-empty result, or `AllSourcesFailed` carrying the last error if
    /// every source in the chain failed or returned empty.
    pub async fn fetch_minutes(
        &self,
        symbol: &Symbol,
        market: MarketKind,
        tz: Tz,
    ) -> Result<Vec<Sample>, FetchError> {
        let chain = sources::chain_for(market);
        let mut last_error = None;

        for spec in chain {
            let attempt = || (spec.fetch)(self.client.clone(), symbol.clone(), tz);
            match with_retry(attempt).await {
                Ok(samples) if !samples.is_empty() => return Ok(samples),
                Ok(_) => last_error = Some(FetchError::Empty { source: spec.name }),
                Err(err) => last_error = Some(err),
            }
        }

        Err(FetchError::AllSourcesFailed(Box::new(
            last_error.unwrap_or(FetchError::Empty {
                source: "unknown",
            }),
        )))
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn china_chain_order() {
        let chain = sources::chain_for(MarketKind::China);
        let names: Vec<&str> = chain.iter().map(|s| s.name).collect();
        assert_eq!(names, ["tencent", "eastmoney", "sina"]);
    }

    #[test]
    fn hong_kong_chain_order() {
        let chain = sources::chain_for(MarketKind::HongKong);
        let names: Vec<&str> = chain.iter().map(|s| s.name).collect();
        assert_eq!(names, ["tencent", "yahoo", "eastmoney"]);
    }

    #[test]
    fn us_chain_is_yahoo_only() {
        let chain = sources::chain_for(MarketKind::Us);
        let names: Vec<&str> = chain.iter().map(|s| s.name).collect();
        assert_eq!(names, ["yahoo"]);
    }
}
