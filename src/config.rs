//! Runtime configuration for the collection engine.
//!
//! Parsing configuration files is out of scope; this module only defines
//! the value types and their defaults, plus a thin env-var override for
//! the CLI harness.

use std::collections::HashMap;

use crate::symbol::MarketKind;

/// Per-market clock configuration (`markets.<m>.*`).
#[derive(Clone, Debug)]
pub struct MarketConfig {
    pub timezone_name: String,
    /// Active weekdays, ISO numbering (1 = Monday .. 7 = Sunday).
    pub weekdays: Vec<u8>,
}

/// `intraday_collection.*`.
#[derive(Clone, Debug)]
pub struct IntradayCollectionConfig {
    pub enable_auto_stop: bool,
    pub completeness_threshold: f64,
    pub max_consecutive_errors: u32,
    pub min_datapoints: u32,
}

impl Default for IntradayCollectionConfig {
    fn default() -> Self {
        Self {
            enable_auto_stop: true,
            completeness_threshold: 90.0,
            max_consecutive_errors: 5,
            min_datapoints: 20,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    markets: HashMap<MarketKind, MarketConfig>,
    pub intraday: IntradayCollectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        let mut markets = HashMap::new();
        markets.insert(
            MarketKind::China,
            MarketConfig {
                timezone_name: "Asia/Shanghai".to_string(),
                weekdays: vec![1, 2, 3, 4, 5],
            },
        );
        markets.insert(
            MarketKind::Us,
            MarketConfig {
                timezone_name: "America/New_York".to_string(),
                weekdays: vec![1, 2, 3, 4, 5],
            },
        );
        markets.insert(
            MarketKind::HongKong,
            MarketConfig {
                timezone_name: "Asia/Hong_Kong".to_string(),
                weekdays: vec![1, 2, 3, 4, 5],
            },
        );
        Self {
            markets,
            intraday: IntradayCollectionConfig::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn market(&self, kind: MarketKind) -> &MarketConfig {
        self.markets
            .get(&kind)
            .expect("every MarketKind has a default MarketConfig entry")
    }

    pub fn set_market(&mut self, kind: MarketKind, config: MarketConfig) {
        self.markets.insert(kind, config);
    }

    /// Builds a config from `INTRADAY_*` environment variables, falling
    /// back to defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("INTRADAY_COMPLETENESS_THRESHOLD") {
            if let Ok(v) = v.parse() {
                config.intraday.completeness_threshold = v;
            }
        }
        if let Ok(v) = std::env::var("INTRADAY_MAX_CONSECUTIVE_ERRORS") {
            if let Ok(v) = v.parse() {
                config.intraday.max_consecutive_errors = v;
            }
        }
        if let Ok(v) = std::env::var("INTRADAY_MIN_DATAPOINTS") {
            if let Ok(v) = v.parse() {
                config.intraday.min_datapoints = v;
            }
        }
        if let Ok(v) = std::env::var("INTRADAY_ENABLE_AUTO_STOP") {
            if let Ok(v) = v.parse() {
                config.intraday.enable_auto_stop = v;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::symbol::MarketKind;

    #[test]
    fn defaults_match_spec_table() {
        let config = Config::default();
        assert!((config.intraday.completeness_threshold - 90.0).abs() < f64::EPSILON);
        assert_eq!(config.intraday.max_consecutive_errors, 5);
        assert_eq!(config.intraday.min_datapoints, 20);
        assert!(config.intraday.enable_auto_stop);
        assert_eq!(config.market(MarketKind::China).timezone_name, "Asia/Shanghai");
        assert_eq!(config.market(MarketKind::Us).timezone_name, "America/New_York");
        assert_eq!(
            config.market(MarketKind::HongKong).timezone_name,
            "Asia/Hong_Kong"
        );
    }
}
