//! Hook for backfilling a `DayFile`'s missing `prev_close` from the
//! external foreground stock-price cache. That cache is an out-of-scope
//! collaborator; this trait is the seam the embedding application
//! implements.

use rust_decimal::Decimal;

use crate::symbol::Symbol;

pub trait PrevCloseSource: Send + Sync {
    fn prev_close(&self, symbol: &Symbol) -> Option<Decimal>;
}

/// Default no-op source so the engine is fully usable standalone.
pub struct NullPrevCloseSource;

impl PrevCloseSource for NullPrevCloseSource {
    fn prev_close(&self, _symbol: &Symbol) -> Option<Decimal> {
        None
    }
}
