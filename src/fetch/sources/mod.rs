//! One submodule per upstream HTTP source.

pub mod eastmoney;
pub mod sina;
pub mod tencent;
pub mod yahoo;

use crate::fetch::client::HttpClient;
use crate::fetch::error::FetchError;
use crate::store::Sample;
use crate::symbol::{MarketKind, Symbol};

/// One named upstream, fetchable given a (cloned) `HttpClient`, an owned
/// `Symbol`, and the market's timezone (needed to render `HH:MM` in
/// market-local time). Owned arguments keep the returned future `'static`
/// so it can live behind a plain `fn` pointer without lifetime gymnastics.
pub struct SourceSpec {
    pub name: &'static str,
    pub fetch: fn(
        HttpClient,
        Symbol,
        chrono_tz::Tz,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Sample>, FetchError>> + Send>>,
}

/// The ordered source chain for `kind`.
#[must_use]
pub fn chain_for(kind: MarketKind) -> &'static [SourceSpec] {
    match kind {
        MarketKind::China => &[
            SourceSpec {
                name: tencent::NAME,
                fetch: |c, s, tz| Box::pin(tencent::fetch(c, s, tz)),
            },
            SourceSpec {
                name: eastmoney::NAME,
                fetch: |c, s, tz| Box::pin(eastmoney::fetch(c, s, tz)),
            },
            SourceSpec {
                name: sina::NAME,
                fetch: |c, s, tz| Box::pin(sina::fetch(c, s, tz)),
            },
        ],
        MarketKind::HongKong => &[
            SourceSpec {
                name: tencent::NAME,
                fetch: |c, s, tz| Box::pin(tencent::fetch(c, s, tz)),
            },
            SourceSpec {
                name: yahoo::NAME,
                fetch: |c, s, tz| Box::pin(yahoo::fetch(c, s, tz)),
            },
            SourceSpec {
                name: eastmoney::NAME,
                fetch: |c, s, tz| Box::pin(eastmoney::fetch(c, s, tz)),
            },
        ],
        MarketKind::Us => &[SourceSpec {
            name: yahoo::NAME,
            fetch: |c, s, tz| Box::pin(yahoo::fetch(c, s, tz)),
        }],
    }
}
