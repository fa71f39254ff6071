//! Tencent minute-bar endpoint.
//!
//! `http://ifzq.gtimg.cn/appstock/app/minute/query?_var=min_data_<code>&code=<code>`
//! — JSONP; the body is `min_data_<code>=<json>`, stripped through the
//! first `=`. Minute lines are `"HHMM price volume amount"`.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::fetch::client::HttpClient;
use crate::fetch::error::FetchError;
use crate::fetch::symbol_transform::convert_for_tencent;
use crate::store::Sample;
use crate::symbol::Symbol;

pub const NAME: &str = "tencent";

pub async fn fetch(client: HttpClient, symbol: Symbol, _tz: Tz) -> Result<Vec<Sample>, FetchError> {
    let code = convert_for_tencent(&symbol);
    let url = format!(
        "http://ifzq.gtimg.cn/appstock/app/minute/query?_var=min_data_{code}&code={code}"
    );

    let body = client
        .get_text(NAME, &url, "http://gu.qq.com/", false)
        .await?;

    let json_part = body.splitn(2, '=').nth(1).ok_or(FetchError::Decode {
        source: NAME,
        detail: "missing JSONP `=` separator".to_string(),
    })?;

    let value: Value = serde_json::from_str(json_part.trim()).map_err(|err| FetchError::Decode {
        source: NAME,
        detail: err.to_string(),
    })?;

    let lines = value
        .pointer(&format!("/data/{code}/data/data"))
        .and_then(Value::as_array)
        .ok_or(FetchError::Decode {
            source: NAME,
            detail: "missing data.<code>.data.data array".to_string(),
        })?;

    let mut samples = Vec::with_capacity(lines.len());
    for line in lines {
        let Some(line) = line.as_str() else { continue };
        let mut parts = line.split_whitespace();
        let (Some(hhmm), Some(price_str)) = (parts.next(), parts.next()) else {
            continue;
        };
        if hhmm.len() != 4 || !hhmm.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let Ok(price) = price_str.parse::<Decimal>() else {
            continue;
        };
        if price <= Decimal::ZERO {
            continue;
        }
        let time = format!("{}:{}", &hhmm[0..2], &hhmm[2..4]);
        samples.push(Sample::new(&time, price));
    }

    if samples.is_empty() {
        return Err(FetchError::Empty { source: NAME });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minute_line_into_sample() {
        let line = "0930 10.50 100 1050.00";
        let mut parts = line.split_whitespace();
        let hhmm = parts.next().unwrap();
        let price: Decimal = parts.next().unwrap().parse().unwrap();
        let time = format!("{}:{}", &hhmm[0..2], &hhmm[2..4]);
        let sample = Sample::new(&time, price);
        assert_eq!(sample.time_str(), "09:30");
    }
}
