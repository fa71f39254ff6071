//! Completeness Oracle: decides whether a day's collected data has
//! reached its completion target.

use crate::config::Config;
use crate::market::expected_datapoints;
use crate::store::Store;
use crate::symbol::{MarketKind, Symbol};

/// `isComplete(symbol, date, market, liveFlag) -> bool`.
///
/// Reads the file via `store`; a missing file is "not complete", not an
/// error. A read error is likewise treated as "not complete".
pub async fn is_complete(
    store: &Store,
    config: &Config,
    symbol: &Symbol,
    date: &str,
    market: MarketKind,
    live_flag: bool,
) -> bool {
    let actual = match store.read(market, symbol, date).await {
        Ok(Some(file)) => file.datapoints.len() as u32,
        Ok(None) | Err(_) => return false,
    };

    let expected = expected_datapoints(market);
    let threshold = if live_flag {
        50.0
    } else {
        config.intraday.completeness_threshold
    };

    let ratio_pct = 100.0 * f64::from(actual) / f64::from(expected.max(1));
    actual >= config.intraday.min_datapoints && ratio_pct >= threshold
}
