use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

use super::checker::{Monitor, MonitorError, RunReport};

/// Report of the most recent completed invocation
pub type LastRun = Arc<RwLock<Option<RunReport>>>;

/// Run a single invocation within a time budget
///
/// On timeout the in-flight probe is abandoned; URLs not yet reached are picked
/// up by the next invocation.
pub async fn run_once(monitor: &Monitor, budget: Duration) -> Result<RunReport, MonitorError> {
    tokio::time::timeout(budget, monitor.run())
        .await
        .map_err(|_| MonitorError::Timeout(budget))
}

/// Fires one heartbeat invocation per interval
///
/// Invocations never overlap: each is awaited (or times out) before the next
/// tick is taken, and ticks missed meanwhile are skipped.
pub struct HeartbeatWorker {
    monitor: Arc<Monitor>,
    run_interval: Duration,
    run_timeout: Duration,
    last_run: LastRun,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl HeartbeatWorker {
    pub fn new(monitor: Arc<Monitor>, run_interval: Duration, run_timeout: Duration) -> Self {
        Self {
            monitor,
            run_interval,
            run_timeout,
            last_run: Arc::new(RwLock::new(None)),
            shutdown_tx: None,
        }
    }

    /// Shared handle to the last completed report
    pub fn last_run(&self) -> LastRun {
        Arc::clone(&self.last_run)
    }

    /// Start the background worker. The first invocation fires immediately.
    pub fn start(&mut self) -> tokio::task::JoinHandle<()> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        let monitor = Arc::clone(&self.monitor);
        let last_run = Arc::clone(&self.last_run);
        let run_interval = self.run_interval;
        let run_timeout = self.run_timeout;

        tokio::spawn(async move {
            tracing::info!(
                "Heartbeat worker started with interval {:?}, timeout {:?}",
                run_interval,
                run_timeout
            );

            let mut ticker = interval(run_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.recv() => break,
                }

                tokio::select! {
                    result = run_once(&monitor, run_timeout) => match result {
                        Ok(report) => {
                            *last_run.write() = Some(report);
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Heartbeat invocation aborted");
                        }
                    },
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Shutdown during invocation, abandoning remaining checks");
                        break;
                    }
                }
            }

            tracing::info!("Heartbeat worker stopped");
        })
    }

    /// Stop the background worker
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }
}
