//! Top-level error type for the Manager's entry points.

use crate::symbol::Symbol;

#[derive(thiserror::Error, Debug, Clone)]
pub enum ManagerError {
    #[error("unknown market kind for symbol {symbol}")]
    UnknownMarket { symbol: Symbol },
}
