use std::time::Duration;

use anyhow::Context;
use intraday_collector::{Config, Manager, Symbol};

#[path = "../cli.rs"]
mod cli;
#[path = "../logger.rs"]
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let bin_name = std::env::args()
        .next()
        .unwrap_or_else(|| "intraday-collector".to_string());

    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{}", err.message);
            std::process::exit(err.code);
        }
    };

    let args = match command {
        cli::Command::Help => {
            println!("{}", cli::help_text(&bin_name));
            return Ok(());
        }
        cli::Command::Version => {
            println!("{}", cli::version_text());
            return Ok(());
        }
        cli::Command::Run(args) => args,
    };

    dotenvy::dotenv().ok();

    let _guard = logger::init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = std::process::id(),
        log_dir = %logger::active_log_dir().display(),
        "intraday-collector starting"
    );

    if args.watchlist.is_empty() {
        println!("{}", cli::help_text(&bin_name));
        return Ok(());
    }

    let manager = Manager::new(Config::from_env());

    for watched in &args.watchlist {
        let symbol = Symbol::new(&watched.symbol);
        manager
            .start_collection(symbol.clone(), watched.name.clone())
            .await
            .with_context(|| format!("starting collection for {symbol}"))?;
        println!("started: {} ({})", watched.symbol, watched.name);
        tracing::info!(symbol = %symbol, name = %watched.name, "worker started");
    }

    tokio::select! {
        () = print_status_loop(&manager) => {}
        () = wait_for_shutdown_signal() => {
            tracing::warn!("shutdown signal received, stopping all workers");
        }
    }

    manager.stop_all();
    manager.join_all().await;
    println!("all workers stopped");

    Ok(())
}

async fn print_status_loop(manager: &Manager) {
    let mut ticker = tokio::time::interval(Duration::from_secs(30));
    loop {
        ticker.tick().await;
        for snapshot in manager.snapshot() {
            let pct = if snapshot.expected_datapoints == 0 {
                0.0
            } else {
                100.0 * f64::from(snapshot.datapoint_count) / f64::from(snapshot.expected_datapoints)
            };
            println!(
                "{}.{}: {:?}, {}, {}/{} ({pct:.0}%)",
                snapshot.symbol,
                snapshot.market,
                snapshot.mode,
                snapshot.target_date,
                snapshot.datapoint_count,
                snapshot.expected_datapoints,
            );
        }
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use std::future::pending;
    use tokio::signal::unix::{signal, Signal, SignalKind};

    async fn recv_or_pending(signal: Option<Signal>) {
        let mut signal = signal;
        if let Some(sig) = signal.as_mut() {
            let _ = sig.recv().await;
            return;
        }
        pending::<()>().await;
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = recv_or_pending(signal(SignalKind::terminate()).ok()) => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
