mod config;
mod league;
mod server;
mod settings;
mod snapshot;
mod state;

use crate::config::LeagueConfig;
use crate::league::standings::render_table;
use crate::settings::Settings;
use crate::snapshot::{DumpDir, SnapshotStore};
use crate::state::cycle::RefreshCycle;
use crate::state::messages::{RefreshRequest, RefreshResponse};
use crate::state::refresher::PeriodicRefresher;
use crate::state::worker::RefreshWorker;
use log::{error, info, warn};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

enum CliAction {
    Run { once: bool },
    Exit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let once = match handle_cli_args() {
        CliAction::Run { once } => once,
        CliAction::Exit => return Ok(()),
    };

    better_panic::install();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load(once);
    let config = LeagueConfig::load()?;
    let store = SnapshotStore::new(&settings.cache_path);
    let dumps = settings.dump_dir.clone().map(DumpDir::new);
    let cycle = RefreshCycle::new(config, store.clone(), dumps)?;

    if settings.run_once {
        std::process::exit(run_once(&cycle).await);
    }

    let (request_tx, request_rx) = mpsc::channel::<RefreshRequest>(1);
    let (response_tx, response_rx) = mpsc::channel::<RefreshResponse>(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Refresh worker: the only place cycles run
    let worker = RefreshWorker::new(cycle, request_rx, response_tx, shutdown_rx.clone());
    let worker_task = tokio::spawn(worker.run());

    // Periodic refresh ticks
    let refresher = PeriodicRefresher::new(request_tx.clone(), settings.interval);
    let refresher_task = tokio::spawn(refresher.run());

    // HTTP read surface
    let bind = settings.bind.clone();
    let mut server_shutdown = shutdown_rx.clone();
    let mut server_task = tokio::spawn(async move {
        server::serve(&bind, store, async move {
            let _ = server_shutdown.wait_for(|stop| *stop).await;
        })
        .await
    });

    // Compute a snapshot right away instead of waiting a full interval
    let _ = request_tx.send(RefreshRequest::Startup).await;

    let exit = main_loop(response_rx, &mut server_task, settings.interval).await;

    info!("shutting down");
    let _ = shutdown_tx.send(true);
    refresher_task.abort();
    if let Err(e) = worker_task.await {
        error!("refresh worker failed: {e}");
    }

    match exit {
        LoopExit::Interrupted => match server_task.await {
            Ok(result) => result,
            Err(e) => Err(e.into()),
        },
        LoopExit::ServerStopped(result) => result,
    }
}

enum LoopExit {
    Interrupted,
    ServerStopped(anyhow::Result<()>),
}

async fn main_loop(
    mut responses: mpsc::Receiver<RefreshResponse>,
    server_task: &mut JoinHandle<anyhow::Result<()>>,
    interval: Duration,
) -> LoopExit {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => return LoopExit::Interrupted,

            joined = &mut *server_task => {
                let result = match joined {
                    Ok(Ok(())) => Err(anyhow::anyhow!("http server stopped unexpectedly")),
                    Ok(Err(e)) => Err(e),
                    Err(e) => Err(e.into()),
                };
                return LoopExit::ServerStopped(result);
            }

            Some(response) = responses.recv() => handle_refresh_response(response, interval),
        }
    }
}

fn handle_refresh_response(response: RefreshResponse, interval: Duration) {
    match response {
        RefreshResponse::CycleFinished { request, ok: true, elapsed } => {
            info!(
                "{request:?} refresh finished in {:.1}s, next in {}s",
                elapsed.as_secs_f32(),
                interval.as_secs()
            );
        }
        RefreshResponse::CycleFinished { request, ok: false, elapsed } => {
            warn!(
                "{request:?} refresh failed after {:.1}s, keeping the previous snapshot; retry in {}s",
                elapsed.as_secs_f32(),
                interval.as_secs()
            );
        }
    }
}

/// Single cycle, standings table on stdout. Returns the exit status.
async fn run_once(cycle: &RefreshCycle) -> i32 {
    match cycle.try_run().await {
        Ok(snapshot) => {
            print!("{}", render_table(&snapshot.standings));
            0
        }
        Err(e) => {
            error!("refresh cycle failed: {e:#}");
            1
        }
    }
}

fn handle_cli_args() -> CliAction {
    let mut once = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return CliAction::Exit;
            }
            "-V" | "--version" => {
                println!("peloteros {}", env!("CARGO_PKG_VERSION"));
                return CliAction::Exit;
            }
            "--once" => once = true,
            _ => {
                eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
                std::process::exit(2);
            }
        }
    }
    CliAction::Run { once }
}

fn usage_text() -> &'static str {
    "peloteros - league standings and playoff bracket service

Usage:
  peloteros            refresh on an interval and serve GET /api/standings
  peloteros --once     refresh once, print the standings table, exit
  peloteros --help
  peloteros --version

Environment:
  RUN_ONCE=1               Same as --once
  UPDATE_INTERVAL_SECONDS  Seconds between refreshes (default 300)
  PELOTEROS_CACHE          Snapshot file (default standings_cache.json)
  PELOTEROS_BIND           HTTP listen address (default 0.0.0.0:8080)
  PELOTEROS_DUMP_DIR       Write per-team capture dumps to this directory
  PELOTEROS_CONFIG         JSON file replacing the built-in league tables
  RUST_LOG                 Log filter (default info)"
}
