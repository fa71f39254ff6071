//! Per-symbol worker: a fetch-merge-save cycle running at a fixed 1-minute
//! cadence, self-terminating once its completion predicates are met.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Semaphore};

use crate::completeness::is_complete;
use crate::config::Config;
use crate::fetch::Fetcher;
use crate::market::{self, TradingState};
use crate::prev_close::PrevCloseSource;
use crate::store::Store;
use crate::symbol::{MarketKind, Symbol};

const TICK_PERIOD: Duration = Duration::from_secs(60);
const MAX_CONSECUTIVE_SKIPS: u32 = 3;

/// Chosen once at Worker start from `(TradingState, completeness of
/// today's file)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionMode {
    Historical,
    Live,
    Complete,
}

/// (symbol, targetDate, mode, startedAt, lastUpdateAt, datapointCount,
/// consecutiveErrors, consecutiveSkips, running).
#[derive(Clone, Debug)]
pub struct WorkerMeta {
    pub symbol: Symbol,
    pub name: String,
    pub market: MarketKind,
    pub target_date: String,
    pub mode: CollectionMode,
    pub started_at: DateTime<Utc>,
    pub last_update_at: Option<DateTime<Utc>>,
    pub datapoint_count: u32,
    pub consecutive_errors: u32,
    pub consecutive_skips: u32,
    pub running: bool,
}

impl WorkerMeta {
    #[must_use]
    pub fn new(symbol: Symbol, name: String, market: MarketKind, target_date: String, mode: CollectionMode) -> Self {
        Self {
            symbol,
            name,
            market,
            target_date,
            mode,
            started_at: Utc::now(),
            last_update_at: None,
            datapoint_count: 0,
            consecutive_errors: 0,
            consecutive_skips: 0,
            running: true,
        }
    }
}

/// Collaborator bundle a Worker needs to run a cycle. Deliberately not a
/// back-reference to the Manager — the Worker is a function of `(handle,
/// deps, sink, cancel)`, never holds the Manager itself.
pub struct WorkerDeps {
    pub fetcher: Arc<Fetcher>,
    pub store: Arc<Store>,
    pub config: Arc<Config>,
    pub semaphore: Arc<Semaphore>,
    pub prev_close: Arc<dyn PrevCloseSource>,
}

/// Where a Worker publishes its telemetry snapshot and removes itself on
/// exit. Implemented by the Manager; narrowed so the Worker never sees the
/// rest of the Manager's state.
pub trait MetaSink: Send + Sync {
    fn publish(&self, meta: WorkerMeta);
    fn remove(&self, symbol: &Symbol);
}

pub struct WorkerHandle {
    pub symbol: Symbol,
    pub name: String,
    pub market: MarketKind,
    pub target_date: String,
    pub mode: CollectionMode,
}

/// Runs the Worker loop until a termination predicate fires or `cancel`
/// fires. Always removes its own `WorkerMeta` on the way out.
pub async fn run(
    handle: WorkerHandle,
    deps: Arc<WorkerDeps>,
    sink: Arc<dyn MetaSink>,
    mut cancel: broadcast::Receiver<()>,
) {
    let WorkerHandle {
        symbol,
        name,
        market,
        target_date,
        mode,
    } = handle;

    let mut meta = WorkerMeta::new(symbol.clone(), name.clone(), market, target_date.clone(), mode);
    sink.publish(meta.clone());

    let mut ticker = tokio::time::interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await; // consume the interval's immediate first tick

    loop {
        let profile = market::effective_profile(&deps.config, market);
        let trading_state = market::trading_state(Utc::now(), &profile);

        let market_open = trading_state == TradingState::Live;
        if mode != CollectionMode::Live || market_open {
            run_cycle(&symbol, &name, &target_date, market, &deps, &mut meta).await;
            meta.last_update_at = Some(Utc::now());
            sink.publish(meta.clone());
        }

        if terminate(&deps, &symbol, &target_date, market, mode, trading_state, &meta).await {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = cancel.recv() => break,
        }
    }

    meta.running = false;
    sink.publish(meta);
    sink.remove(&symbol);
}

async fn run_cycle(
    symbol: &Symbol,
    name: &str,
    target_date: &str,
    market: MarketKind,
    deps: &WorkerDeps,
    meta: &mut WorkerMeta,
) {
    let Ok(_permit) = deps.semaphore.clone().acquire_owned().await else {
        return;
    };

    let profile = market::effective_profile(&deps.config, market);
    let fetched = deps.fetcher.fetch_minutes(symbol, market, profile.timezone).await;

    let samples = match fetched {
        Ok(samples) => samples,
        Err(err) => {
            tracing::warn!(symbol = %symbol, error = %err, "fetch cycle failed");
            meta.consecutive_errors += 1;
            meta.consecutive_skips = 0;
            return;
        }
    };

    match deps
        .store
        .merge_and_save(market, symbol, name, target_date, &samples)
        .await
    {
        Ok((decision, merged)) => {
            meta.consecutive_errors = 0;
            match decision {
                crate::store::SaveDecision::Skip => meta.consecutive_skips += 1,
                crate::store::SaveDecision::Append | crate::store::SaveDecision::Update => {
                    meta.consecutive_skips = 0;
                    meta.datapoint_count = merged.len() as u32;
                }
            }
            deps.store
                .backfill_prev_close(market, symbol, target_date, deps.prev_close.as_ref())
                .await;
        }
        Err(err) => {
            tracing::warn!(symbol = %symbol, error = %err, "store cycle failed");
            meta.consecutive_errors += 1;
            meta.consecutive_skips = 0;
        }
    }
}

/// Evaluates the termination predicates in order.
async fn terminate(
    deps: &WorkerDeps,
    symbol: &Symbol,
    target_date: &str,
    market: MarketKind,
    mode: CollectionMode,
    trading_state: TradingState,
    meta: &WorkerMeta,
) -> bool {
    if !deps.config.intraday.enable_auto_stop {
        return false;
    }

    if meta.consecutive_errors >= deps.config.intraday.max_consecutive_errors {
        return true;
    }
    if meta.consecutive_skips >= MAX_CONSECUTIVE_SKIPS {
        return true;
    }
    if mode == CollectionMode::Historical
        && is_complete(&deps.store, &deps.config, symbol, target_date, market, false).await
    {
        return true;
    }
    if mode == CollectionMode::Live
        && trading_state == TradingState::PostMarket
        && is_complete(&deps.store, &deps.config, symbol, target_date, market, false).await
    {
        return true;
    }
    false
}
