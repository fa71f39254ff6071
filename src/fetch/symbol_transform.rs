//! Per-source wire-format symbol transforms.

use crate::symbol::Symbol;

fn digits_after(s: &str, prefix: &str) -> Option<&str> {
    s.strip_prefix(prefix)
        .filter(|rest| rest.bytes().all(|b| b.is_ascii_digit()))
}

fn hk_digits(s: &str) -> Option<&str> {
    digits_after(s, "HK").or_else(|| s.strip_suffix(".HK").filter(|rest| {
        !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
    }))
}

/// `SH…→sh…`, `SZ…→sz…`, `HK…`/`….HK` → `hk` + zero-padded-to-5 digits,
/// else lowercase unchanged.
#[must_use]
pub fn convert_for_tencent(symbol: &Symbol) -> String {
    let s = symbol.as_str();
    if let Some(digits) = digits_after(s, "SH") {
        return format!("sh{digits}");
    }
    if let Some(digits) = digits_after(s, "SZ") {
        return format!("sz{digits}");
    }
    if let Some(digits) = hk_digits(s) {
        return format!("hk{digits:0>5}");
    }
    s.to_lowercase()
}

/// `SH…→1.<digits>`, `SZ…→0.<digits>`, `HK…`/`….HK` → `116.<5-digit-padded>`.
#[must_use]
pub fn convert_for_eastmoney(symbol: &Symbol) -> Option<String> {
    let s = symbol.as_str();
    if let Some(digits) = digits_after(s, "SH") {
        return Some(format!("1.{digits}"));
    }
    if let Some(digits) = digits_after(s, "SZ") {
        return Some(format!("0.{digits}"));
    }
    if let Some(digits) = hk_digits(s) {
        return Some(format!("116.{digits:0>5}"));
    }
    None
}

/// `HK<digits>` / `<digits>.HK` → `<digits-no-leading-zeros>.HK`; anything
/// else (US tickers, already-suffixed HK symbols) is passed through
/// unchanged.
#[must_use]
pub fn convert_for_yahoo(symbol: &Symbol) -> String {
    let s = symbol.as_str();
    if let Some(digits) = digits_after(s, "HK") {
        let trimmed = digits.trim_start_matches('0');
        let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
        return format!("{trimmed}.HK");
    }
    s.to_string()
}

/// Sina only appears in the China source chain; it takes the same
/// lowercase `sh`/`sz` wire code as Tencent.
#[must_use]
pub fn convert_for_sina(symbol: &Symbol) -> Option<String> {
    let s = symbol.as_str();
    if let Some(digits) = digits_after(s, "SH") {
        return Some(format!("sh{digits}"));
    }
    if let Some(digits) = digits_after(s, "SZ") {
        return Some(format!("sz{digits}"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{convert_for_eastmoney, convert_for_tencent, convert_for_yahoo};
    use crate::symbol::Symbol;

    #[test]
    fn tencent_transforms() {
        assert_eq!(convert_for_tencent(&Symbol::new("SH600000")), "sh600000");
        assert_eq!(convert_for_tencent(&Symbol::new("HK9626")), "hk09626");
        assert_eq!(convert_for_tencent(&Symbol::new("HK2020")), "hk02020");
        assert_eq!(convert_for_tencent(&Symbol::new("HK700")), "hk00700");
        assert_eq!(convert_for_tencent(&Symbol::new("0700.HK")), "hk00700");
        assert_eq!(convert_for_tencent(&Symbol::new("AAPL")), "aapl");
    }

    #[test]
    fn yahoo_transforms() {
        assert_eq!(convert_for_yahoo(&Symbol::new("HK00700")), "700.HK");
        assert_eq!(convert_for_yahoo(&Symbol::new("HK9626")), "9626.HK");
        assert_eq!(convert_for_yahoo(&Symbol::new("0700.HK")), "0700.HK");
        assert_eq!(convert_for_yahoo(&Symbol::new("AAPL")), "AAPL");
    }

    #[test]
    fn eastmoney_transforms() {
        assert_eq!(
            convert_for_eastmoney(&Symbol::new("SH600000")),
            Some("1.600000".to_string())
        );
        assert_eq!(
            convert_for_eastmoney(&Symbol::new("SZ000001")),
            Some("0.000001".to_string())
        );
        assert_eq!(
            convert_for_eastmoney(&Symbol::new("HK2020")),
            Some("116.02020".to_string())
        );
    }
}
