//! EastMoney trends2 endpoint.
//!
//! `https://push2.eastmoney.com/api/qt/stock/trends2/get?secid=<code>&fields1=f1,f2,f3&fields2=f51,f52,f53,f54,f55&iscr=0`
//! — CSV trend lines `"YYYY-MM-DD HH:MM,price,..."`.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::fetch::client::HttpClient;
use crate::fetch::error::FetchError;
use crate::fetch::symbol_transform::convert_for_eastmoney;
use crate::store::Sample;
use crate::symbol::Symbol;

pub const NAME: &str = "eastmoney";

#[derive(Deserialize)]
struct TrendsResponse {
    data: Option<TrendsData>,
}

#[derive(Deserialize)]
struct TrendsData {
    trends: Vec<String>,
}

pub async fn fetch(client: HttpClient, symbol: Symbol, _tz: Tz) -> Result<Vec<Sample>, FetchError> {
    let secid = convert_for_eastmoney(&symbol).ok_or(FetchError::Empty { source: NAME })?;
    let url = format!(
        "https://push2.eastmoney.com/api/qt/stock/trends2/get?secid={secid}&fields1=f1,f2,f3&fields2=f51,f52,f53,f54,f55&iscr=0"
    );

    let body = client
        .get_text(NAME, &url, "https://quote.eastmoney.com/", false)
        .await?;

    let parsed: TrendsResponse = serde_json::from_str(&body).map_err(|err| FetchError::Decode {
        source: NAME,
        detail: err.to_string(),
    })?;

    let trends = parsed
        .data
        .map(|d| d.trends)
        .ok_or(FetchError::Empty { source: NAME })?;

    let mut samples = Vec::with_capacity(trends.len());
    for line in trends {
        let mut fields = line.splitn(2, ',');
        let (Some(datetime), Some(rest)) = (fields.next(), fields.next()) else {
            continue;
        };
        let Some(time_part) = datetime.split_whitespace().nth(1) else {
            continue;
        };
        let Some(price_str) = rest.split(',').next() else {
            continue;
        };
        let Ok(price) = price_str.parse::<Decimal>() else {
            continue;
        };
        if price <= Decimal::ZERO || time_part.len() != 5 {
            continue;
        }
        samples.push(Sample::new(time_part, price));
    }

    if samples.is_empty() {
        return Err(FetchError::Empty { source: NAME });
    }
    Ok(samples)
}
