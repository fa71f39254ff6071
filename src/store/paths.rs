//! Day-file path resolution: partitioned layout for writes, with a
//! read-only legacy flat-layout fallback.

use std::path::{Path, PathBuf};

use crate::symbol::{MarketKind, Symbol};

/// Root of the `data/intraday/...` tree. Overridable via
/// `INTRADAY_DATA_DIR` (or the legacy `IDCE_DATA_DIR`), defaulting to
/// `./data` relative to the current working directory.
#[must_use]
pub fn data_root() -> PathBuf {
    crate::path_env::dir_override("INTRADAY_DATA_DIR", "IDCE_DATA_DIR")
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// `data/intraday/<MKT>/<SYMBOL>/<YYYYMMDD>.json` — the layout all writes
/// target.
#[must_use]
pub fn partitioned_path(root: &Path, market: MarketKind, symbol: &Symbol, date: &str) -> PathBuf {
    root.join("intraday")
        .join(market.code())
        .join(symbol.as_str())
        .join(format!("{date}.json"))
}

/// `data/intraday/<SYMBOL>/<YYYYMMDD>.json` — deprecated, read-only.
#[must_use]
pub fn legacy_path(root: &Path, symbol: &Symbol, date: &str) -> PathBuf {
    root.join("intraday")
        .join(symbol.as_str())
        .join(format!("{date}.json"))
}

/// Resolves the path to read from: the partitioned layout if present,
/// otherwise the legacy flat layout, otherwise the partitioned path (so a
/// first-ever read behaves like "not found" at a sensible future write
/// location).
#[must_use]
pub fn resolve_for_read(root: &Path, market: MarketKind, symbol: &Symbol, date: &str) -> PathBuf {
    let partitioned = partitioned_path(root, market, symbol, date);
    if partitioned.exists() {
        return partitioned;
    }
    let legacy = legacy_path(root, symbol, date);
    if legacy.exists() {
        return legacy;
    }
    partitioned
}

/// Writes always use the partitioned layout.
#[must_use]
pub fn resolve_for_write(root: &Path, market: MarketKind, symbol: &Symbol, date: &str) -> PathBuf {
    partitioned_path(root, market, symbol, date)
}
