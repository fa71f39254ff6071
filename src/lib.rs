//! Intraday Data Collection Engine: a market-aware, self-regulating
//! scheduler that maintains per-symbol background workers fetching
//! minute-level price data and merging it into durable per-day files.

pub mod completeness;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manager;
pub mod market;
pub mod path_env;
pub mod prev_close;
pub mod store;
pub mod symbol;
pub mod worker;

pub use config::Config;
pub use error::ManagerError;
pub use manager::{Manager, WorkerSnapshot};
pub use prev_close::{NullPrevCloseSource, PrevCloseSource};
pub use store::{DayFile, Sample, SaveDecision, Store, StoreError};
pub use symbol::{MarketKind, Symbol};
pub use worker::CollectionMode;
