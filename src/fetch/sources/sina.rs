//! Sina K-line endpoint — last resort for China.
//!
//! `http://money.finance.sina.com.cn/quotes_service/api/json_v2.php/CN_MarketData.getKLineData?symbol=<sinaCode>&scale=1&datalen=250`
//! — array of `{day, open, high, low, close, volume}`; `day` is a
//! datetime string, `close` is the price. May omit today's partial bar.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::fetch::client::HttpClient;
use crate::fetch::error::FetchError;
use crate::fetch::symbol_transform::convert_for_sina;
use crate::store::Sample;
use crate::symbol::Symbol;

pub const NAME: &str = "sina";

#[derive(Deserialize)]
struct KLineBar {
    day: String,
    close: Decimal,
}

pub async fn fetch(client: HttpClient, symbol: Symbol, _tz: Tz) -> Result<Vec<Sample>, FetchError> {
    let code = convert_for_sina(&symbol).ok_or(FetchError::Empty { source: NAME })?;
    let url = format!(
        "http://money.finance.sina.com.cn/quotes_service/api/json_v2.php/CN_MarketData.getKLineData?symbol={code}&scale=1&datalen=250"
    );

    let body = client
        .get_text(NAME, &url, "http://finance.sina.com.cn/", true)
        .await?;

    let bars: Vec<KLineBar> = serde_json::from_str(&body).map_err(|err| FetchError::Decode {
        source: NAME,
        detail: err.to_string(),
    })?;

    let mut samples = Vec::with_capacity(bars.len());
    for bar in bars {
        let Some(time_part) = bar.day.split_whitespace().nth(1) else {
            continue;
        };
        let time_part = if time_part.len() >= 5 { &time_part[0..5] } else { continue };
        if bar.close <= Decimal::ZERO {
            continue;
        }
        samples.push(Sample::new(time_part, bar.close));
    }

    if samples.is_empty() {
        return Err(FetchError::Empty { source: NAME });
    }
    Ok(samples)
}
