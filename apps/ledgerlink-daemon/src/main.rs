//! # LedgerLink Daemon
//!
//! Runs the storefront ↔ ERP sync engine with its HTTP surface and
//! scheduled syncs.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            RUST_LOG or info,ledgerlink=debug         │
//! │  2. BridgeConfig::load()      defaults → bridge.toml → LEDGERLINK_*     │
//! │  3. Database::new()           SQLite, migrations                        │
//! │  4. SyncEngine::from_config() reqwest ERP client + SQLite storefront    │
//! │  5. scheduler::spawn()        one interval per enabled schedule row     │
//! │  6. axum::serve()             until Ctrl+C / SIGTERM                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```text
//! ledgerlink [path/to/bridge.toml]
//! ```

mod error;
mod routes;
mod scheduler;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use ledgerlink_db::{Database, DbConfig};
use ledgerlink_sync::{BridgeConfig, SyncEngine};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting LedgerLink v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match BridgeConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Refusing to start with invalid configuration");
            return Err(e.into());
        }
    };

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let db = Database::new(DbConfig::new(&config.database.path)).await?;

    let bind = config.server.bind.clone();
    let engine = Arc::new(SyncEngine::from_config(config, db)?);

    let tasks = scheduler::spawn(engine.clone())?;
    let app = routes::router(AppState::new(engine.clone()));

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(addr = %bind, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for task in tasks {
        task.abort();
    }
    engine.database().close().await;

    info!("Shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show all debug logs
/// - `RUST_LOG=ledgerlink_sync=trace` - Trace the sync engine only
/// - Default: INFO, DEBUG for ledgerlink crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,ledgerlink=debug,ledgerlink_sync=debug,ledgerlink_db=debug,sqlx=warn")
    });

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
