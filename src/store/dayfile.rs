//! The persisted per-(symbol, date) JSON document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::symbol::MarketKind;

/// `(time: HH:MM, price: float>0)`, market-local.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: String,
    pub price: Decimal,
}

impl Sample {
    /// # Panics
    /// Panics if `time` is not a five-char `HH:MM` string or `price <= 0`.
    /// Callers only ever construct samples from already-validated fetcher
    /// output or existing on-disk data.
    #[must_use]
    pub fn new(time: &str, price: Decimal) -> Self {
        assert_eq!(time.len(), 5, "time must be HH:MM");
        assert!(price > Decimal::ZERO, "price must be > 0");
        Self {
            time: time.to_string(),
            price,
        }
    }

    #[must_use]
    pub fn time_str(&self) -> &str {
        &self.time
    }
}

/// The three save outcomes distinguished by the merge classifier.
/// `Append` and `Update` are identical on disk; the distinction exists
/// purely to drive Worker telemetry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveDecision {
    Skip,
    Append,
    Update,
}

/// One persisted file: `(symbol, name, date, market, prevClose?, samples,
/// updatedAt)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayFile {
    pub code: String,
    pub name: String,
    pub date: String,
    pub market: String,
    pub datapoints: Vec<Sample>,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_close: Option<Decimal>,
}

impl DayFile {
    #[must_use]
    pub fn new_empty(code: &str, name: &str, date: &str, market: MarketKind) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            date: date.to_string(),
            market: market.code().to_string(),
            datapoints: Vec::new(),
            updated_at: String::new(),
            prev_close: None,
        }
    }
}
