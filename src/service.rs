//! Wiring of the prober, store, notifier and scheduler into a running service

use std::sync::Arc;

use crate::alerts::TopicNotifier;
use crate::api::{run_server, AppState};
use crate::config::{HeartbeatConfig, StoreKind};
use crate::monitor::{run_once, HeartbeatWorker, Monitor};
use crate::probe::HttpProber;
use crate::store::{FileStore, MemoryStore, OfflineStore};

/// Construct the offline store selected by the config
pub fn build_store(config: &HeartbeatConfig) -> Result<Arc<dyn OfflineStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn OfflineStore> = match config.store_kind {
        StoreKind::File => {
            let store = FileStore::open(config.file_store_config())?;
            tracing::info!("Offline table: {}", store.path().display());
            Arc::new(store)
        }
        StoreKind::Memory => {
            tracing::info!("Offline table: in-memory ({})", config.table_name);
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

/// Construct a monitor with HTTP probing and topic notifications
pub fn build_monitor(
    config: &HeartbeatConfig,
    store: Arc<dyn OfflineStore>,
) -> Result<Monitor, Box<dyn std::error::Error>> {
    let prober = Arc::new(HttpProber::new()?);
    let notifier = Arc::new(TopicNotifier::new(config.topic()));

    Ok(Monitor::new(config.urls.clone(), prober, store, notifier))
}

/// Run the heartbeat service
///
/// With `run_once` set, performs one invocation and returns. Otherwise runs the
/// scheduler (and the status API, if configured) until Ctrl+C.
pub async fn run(config: HeartbeatConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = build_store(&config)?;
    let monitor = build_monitor(&config, Arc::clone(&store))?;

    if config.run_once {
        let report = run_once(&monitor, config.run_timeout).await?;
        if !report.failures.is_empty() {
            return Err(format!("{} URL check(s) failed", report.failures.len()).into());
        }
        return Ok(());
    }

    let mut worker = HeartbeatWorker::new(Arc::new(monitor), config.run_interval, config.run_timeout);
    let worker_handle = worker.start();

    match config.status_addr {
        Some(addr) => {
            let state = Arc::new(AppState {
                store,
                urls: config.urls.clone(),
                last_run: worker.last_run(),
            });
            run_server(addr, state, shutdown_signal()).await?;
        }
        None => shutdown_signal().await,
    }

    worker.stop().await;
    if let Err(e) = worker_handle.await {
        tracing::error!(error = %e, "Heartbeat worker panicked");
    }

    tracing::info!("Heartbeat service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
        return;
    }

    tracing::info!("Shutdown signal received, stopping worker...");
}
