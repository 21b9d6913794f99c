//! `ballot ledger run`: an in-process ledger served over JSON-RPC.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use ballot_ledger::{LedgerConfig, LedgerSnapshot, MemoryLedger};
use ballot_rpc::RpcServer;
use ballot_types::SystemClock;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::config::LedgerNodeConfig;

pub async fn run(config: LedgerNodeConfig) -> anyhow::Result<()> {
    let ledger = Arc::new(open_ledger(config.policy.clone(), config.data_file.as_deref())?);
    if config.policy.operators.is_empty() {
        warn!("no operators configured; nobody can start or close proposals");
    }

    let listener = TcpListener::bind((config.bind.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.bind, config.port))?;
    let server = RpcServer::new(Arc::clone(&ledger))?;

    info!(
        bind = %config.bind,
        port = config.port,
        operators = config.policy.operators.len(),
        accept_votes_after_end = config.policy.accept_votes_after_end,
        "starting ledger node"
    );
    server.serve(listener, shutdown_signal()).await?;

    if let Some(path) = &config.data_file {
        save(&ledger, path)?;
    }
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    tokio::select! {
        _ = signal::ctrl_c() => info!("received SIGINT, shutting down"),
        _ = terminate() => info!("received SIGTERM, shutting down"),
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

fn open_ledger(policy: LedgerConfig, data_file: Option<&Path>) -> anyhow::Result<MemoryLedger> {
    let Some(path) = data_file else {
        return Ok(MemoryLedger::new(policy));
    };
    let snapshot = LedgerSnapshot::load(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    Ok(match snapshot {
        Some(snapshot) => {
            info!(
                path = %path.display(),
                height = snapshot.block_height,
                proposals = snapshot.book.count(),
                "restored ledger snapshot"
            );
            MemoryLedger::from_snapshot(snapshot, policy, Arc::new(SystemClock))
        }
        None => {
            info!(path = %path.display(), "no snapshot yet, starting empty");
            MemoryLedger::new(policy)
        }
    })
}

fn save(ledger: &MemoryLedger, path: &Path) -> anyhow::Result<()> {
    let pending = ledger.pending_count();
    if pending > 0 {
        warn!(pending, "discarding unconfirmed transactions on shutdown");
    }
    let snapshot = ledger.snapshot();
    snapshot
        .save(path)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    info!(path = %path.display(), height = snapshot.block_height, "ledger snapshot saved");
    Ok(())
}
