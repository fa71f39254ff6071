//! Yahoo Finance chart endpoint — sole source for US, fallback for HK.
//!
//! `https://query1.finance.yahoo.com/v8/finance/chart/<yahooSymbol>?interval=1m&range=1d`
//! — Unix timestamps (UTC) paired with a per-minute close array; null/zero
//! closes are dropped.

use chrono::TimeZone;
use chrono_tz::Tz;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::fetch::client::HttpClient;
use crate::fetch::error::FetchError;
use crate::fetch::symbol_transform::convert_for_yahoo;
use crate::store::Sample;
use crate::symbol::Symbol;

pub const NAME: &str = "yahoo";

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize)]
struct Quote {
    close: Vec<Option<f64>>,
}

pub async fn fetch(client: HttpClient, symbol: Symbol, tz: Tz) -> Result<Vec<Sample>, FetchError> {
    let code = convert_for_yahoo(&symbol);
    let url = format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{code}?interval=1m&range=1d"
    );

    let body = client
        .get_text(NAME, &url, "https://finance.yahoo.com/", false)
        .await?;

    let parsed: ChartResponse = serde_json::from_str(&body).map_err(|err| FetchError::Decode {
        source: NAME,
        detail: err.to_string(),
    })?;

    let result = parsed
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or(FetchError::Empty { source: NAME })?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let mut samples = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.into_iter().zip(closes.into_iter()) {
        let Some(close) = close else { continue };
        if close <= 0.0 {
            continue;
        }
        let Some(price) = Decimal::from_f64(close) else {
            continue;
        };
        let Some(utc) = chrono::Utc.timestamp_opt(ts, 0).single() else {
            continue;
        };
        let local = utc.with_timezone(&tz);
        let time = local.format("%H:%M").to_string();
        samples.push(Sample::new(&time, price));
    }

    if samples.is_empty() {
        return Err(FetchError::Empty { source: NAME });
    }
    Ok(samples)
}
