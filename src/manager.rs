//! Fleet controller: de-duplicates Workers per symbol, bounds global fetch
//! concurrency, owns worker metadata and the shared cancel signal.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinHandle;

use crate::completeness::is_complete;
use crate::config::Config;
use crate::error::ManagerError;
use crate::fetch::Fetcher;
use crate::market::{self, TradingState};
use crate::prev_close::{NullPrevCloseSource, PrevCloseSource};
use crate::store::Store;
use crate::symbol::{MarketKind, Symbol};
use crate::worker::{self, CollectionMode, MetaSink, WorkerDeps, WorkerHandle, WorkerMeta};

const CONCURRENCY_CAPACITY: usize = 10;

/// Read-only snapshot of one Worker's telemetry, for the UI/CLI. A thin
/// rendering of [`WorkerMeta`] plus the completeness ratio the CLI prints
/// alongside it.
#[derive(Clone, Debug)]
pub struct WorkerSnapshot {
    pub symbol: Symbol,
    pub name: String,
    pub market: MarketKind,
    pub target_date: String,
    pub mode: CollectionMode,
    pub datapoint_count: u32,
    pub expected_datapoints: u32,
    pub consecutive_errors: u32,
    pub consecutive_skips: u32,
    pub running: bool,
}

impl From<WorkerMeta> for WorkerSnapshot {
    fn from(meta: WorkerMeta) -> Self {
        Self {
            expected_datapoints: market::expected_datapoints(meta.market),
            symbol: meta.symbol,
            name: meta.name,
            market: meta.market,
            target_date: meta.target_date,
            mode: meta.mode,
            datapoint_count: meta.datapoint_count,
            consecutive_errors: meta.consecutive_errors,
            consecutive_skips: meta.consecutive_skips,
            running: meta.running,
        }
    }
}

struct ManagerSink {
    metadata: DashMap<Symbol, WorkerMeta>,
}

impl MetaSink for ManagerSink {
    fn publish(&self, meta: WorkerMeta) {
        self.metadata.insert(meta.symbol.clone(), meta);
    }

    fn remove(&self, symbol: &Symbol) {
        self.metadata.remove(symbol);
    }
}

/// Fleet controller.
pub struct Manager {
    deps: Arc<WorkerDeps>,
    sink: Arc<ManagerSink>,
    handles: DashMap<Symbol, JoinHandle<()>>,
    cancel_tx: broadcast::Sender<()>,
    stopped: std::sync::atomic::AtomicBool,
}

impl Manager {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_prev_close_source(config, Arc::new(NullPrevCloseSource))
    }

    #[must_use]
    pub fn with_prev_close_source(config: Config, prev_close: Arc<dyn PrevCloseSource>) -> Self {
        let (cancel_tx, _rx) = broadcast::channel(1);
        Self {
            deps: Arc::new(WorkerDeps {
                fetcher: Arc::new(Fetcher::new()),
                store: Arc::new(Store::with_default_root()),
                config: Arc::new(config),
                semaphore: Arc::new(Semaphore::new(CONCURRENCY_CAPACITY)),
                prev_close,
            }),
            sink: Arc::new(ManagerSink {
                metadata: DashMap::new(),
            }),
            handles: DashMap::new(),
            cancel_tx,
            stopped: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Starts collection for `symbol`. Computes `(targetDate, mode)` via
    /// the Market Clock and Completeness Oracle; silently returns if mode
    /// is `Complete` or a Worker for `symbol` already exists.
    pub async fn start_collection(&self, symbol: Symbol, name: String) -> Result<(), ManagerError> {
        if self.stopped.load(std::sync::atomic::Ordering::SeqCst) {
            return Ok(());
        }
        if self.handles.contains_key(&symbol) {
            return Ok(());
        }

        let market = market::market_of(&symbol);
        let profile = market::effective_profile(&self.deps.config, market);
        let trading_state = market::trading_state(chrono::Utc::now(), &profile);
        let today = chrono::Utc::now()
            .with_timezone(&profile.timezone)
            .format("%Y%m%d")
            .to_string();

        let (target_date, mode) = match trading_state {
            TradingState::PreMarket | TradingState::Weekend | TradingState::Holiday => (
                market::previous_trading_day(&symbol, &today),
                CollectionMode::Historical,
            ),
            TradingState::Live => (today, CollectionMode::Live),
            TradingState::PostMarket => {
                if is_complete(&self.deps.store, &self.deps.config, &symbol, &today, market, false).await {
                    (today, CollectionMode::Complete)
                } else {
                    (today, CollectionMode::Historical)
                }
            }
        };

        if mode == CollectionMode::Complete {
            return Ok(());
        }

        let handle = WorkerHandle {
            symbol: symbol.clone(),
            name,
            market,
            target_date,
            mode,
        };

        let deps = Arc::clone(&self.deps);
        let sink = Arc::clone(&self.sink) as Arc<dyn MetaSink>;
        let cancel_rx = self.cancel_tx.subscribe();

        let join_handle = tokio::spawn(worker::run(handle, deps, sink, cancel_rx));
        self.handles.insert(symbol, join_handle);

        Ok(())
    }

    /// Closes the shared cancel channel; existing Workers observe it and
    /// terminate. Single-use: a fresh `Manager` instance is required to
    /// start new Workers afterward.
    pub fn stop_all(&self) {
        self.stopped.store(true, std::sync::atomic::Ordering::SeqCst);
        let _ = self.cancel_tx.send(());
    }

    /// Waits for every currently-tracked Worker task to finish. Useful for
    /// tests and graceful-shutdown CLI paths after [`Manager::stop_all`].
    pub async fn join_all(&self) {
        let symbols: Vec<Symbol> = self.handles.iter().map(|e| e.key().clone()).collect();
        for symbol in symbols {
            if let Some((_, handle)) = self.handles.remove(&symbol) {
                let _ = handle.await;
            }
        }
    }

    /// Read-only copy of the worker metadata table, for the UI/CLI.
    #[must_use]
    pub fn snapshot(&self) -> Vec<WorkerSnapshot> {
        self.sink
            .metadata
            .iter()
            .map(|e| WorkerSnapshot::from(e.value().clone()))
            .collect()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_collection_is_idempotent_per_symbol() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("INTRADAY_DATA_DIR", dir.path());
        let manager = Manager::new(Config::default());

        manager
            .start_collection(Symbol::new("AAPL"), "Apple".to_string())
            .await
            .unwrap();
        manager
            .start_collection(Symbol::new("AAPL"), "Apple".to_string())
            .await
            .unwrap();

        assert_eq!(manager.active_count(), 1);

        manager.stop_all();
        manager.join_all().await;
        std::env::remove_var("INTRADAY_DATA_DIR");
    }

    #[tokio::test]
    async fn stop_all_terminates_workers() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("INTRADAY_DATA_DIR", dir.path());
        let manager = Manager::new(Config::default());

        manager
            .start_collection(Symbol::new("AAPL"), "Apple".to_string())
            .await
            .unwrap();
        assert_eq!(manager.active_count(), 1);

        manager.stop_all();
        manager.join_all().await;

        assert_eq!(manager.active_count(), 0);
        std::env::remove_var("INTRADAY_DATA_DIR");
    }
}
