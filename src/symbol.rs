//! Canonical instrument identifiers and market detection.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Market an instrument trades on. Drives timezone, session table,
/// expected datapoints and fetcher source order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketKind {
    China,
    Us,
    HongKong,
}

impl MarketKind {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::China => "CN",
            Self::Us => "US",
            Self::HongKong => "HK",
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Opaque uppercase instrument identifier.
///
/// Normalized to uppercase and trimmed before storage; market is a pure
/// function of the normalized form (see [`Symbol::market`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

static SH_SZ: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(SH|SZ)\d{6}$").unwrap());
static BARE_SIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{6}$").unwrap());
static HK_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^HK\d{3,5}$").unwrap());
static HK_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{3,5}\.HK$").unwrap());

impl Symbol {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pure function of the normalized symbol: prefix/suffix forms for
    /// Hong Kong, prefixed or leading-digit forms for mainland China,
    /// everything else falls through to US.
    #[must_use]
    pub fn market(&self) -> MarketKind {
        let s = self.0.as_str();
        if let Some(rest) = s.strip_prefix("SH") {
            if rest.len() == 6 && rest.bytes().all(|b| b.is_ascii_digit()) {
                return MarketKind::China;
            }
        }
        if let Some(rest) = s.strip_prefix("SZ") {
            if rest.len() == 6 && rest.bytes().all(|b| b.is_ascii_digit()) {
                return MarketKind::China;
            }
        }
        if HK_PREFIX.is_match(s) || HK_SUFFIX.is_match(s) {
            return MarketKind::HongKong;
        }
        if BARE_SIX.is_match(s) {
            let first = s.as_bytes()[0];
            if first == b'0' || first == b'3' || first == b'6' {
                return MarketKind::China;
            }
        }
        MarketKind::Us
    }

    /// True if the symbol parses as one of the recognized CN/HK forms
    /// (`SH######`, `SZ######`, bare six-digit, `HK###..#####`,
    /// `###..#####.HK`). Anything else is treated as a US ticker, which is
    /// always "recognized" in that sense (`market` is a total function).
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        SH_SZ.is_match(&self.0)
            || BARE_SIX.is_match(&self.0)
            || HK_PREFIX.is_match(&self.0)
            || HK_SUFFIX.is_match(&self.0)
            || !self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl std::str::FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::{MarketKind, Symbol};

    #[test]
    fn detects_shanghai_and_shenzhen_prefixes() {
        assert_eq!(Symbol::new("sh600000").market(), MarketKind::China);
        assert_eq!(Symbol::new("SZ000001").market(), MarketKind::China);
    }

    #[test]
    fn detects_bare_six_digit_by_leading_byte() {
        assert_eq!(Symbol::new("600519").market(), MarketKind::China);
        assert_eq!(Symbol::new("000001").market(), MarketKind::China);
        assert_eq!(Symbol::new("300750").market(), MarketKind::China);
        assert_eq!(Symbol::new("900901").market(), MarketKind::Us);
    }

    #[test]
    fn detects_hong_kong_forms() {
        assert_eq!(Symbol::new("HK9626").market(), MarketKind::HongKong);
        assert_eq!(Symbol::new("0700.HK").market(), MarketKind::HongKong);
    }

    #[test]
    fn falls_back_to_us() {
        assert_eq!(Symbol::new("aapl").market(), MarketKind::Us);
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(Symbol::new("  aapl  ").as_str(), "AAPL");
    }
}
