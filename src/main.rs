//! Heartbeat Monitor
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - HEARTBEAT_URLS: `$`-delimited list of URLs to probe (required)
//! - HEARTBEAT_RUN_INTERVAL_MINUTES: Minutes between invocations (default: 5)
//! - HEARTBEAT_RUN_TIMEOUT_SECONDS: Budget for one invocation (default: 60)
//! - HEARTBEAT_NOTIFICATION_EMAIL: Alert destination forwarded to the webhook relay
//! - HEARTBEAT_NOTIFICATION_TOPIC: Notification topic name (default: HeartbeatNotifications)
//! - HEARTBEAT_NOTIFICATION_WEBHOOK_URL: Webhook relay subscribed to the topic
//! - HEARTBEAT_STORE: Offline store backend, `file` or `memory` (default: file)
//! - HEARTBEAT_OFFLINE_TABLE_NAME: Offline table name (default: OfflineHeartbeats)
//! - HEARTBEAT_DATA_DIR: Directory for file tables (default: ./heartbeat_data)
//! - HEARTBEAT_STATUS_ADDR: Bind address for the status API (default: disabled)
//! - HEARTBEAT_RUN_ONCE: Run a single invocation and exit (default: false)
//! - RUST_LOG: Log level (default: heartbeat=info)

use heartbeat::config::StoreKind;
use heartbeat::HeartbeatConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heartbeat=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match HeartbeatConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!("Heartbeat configuration:");
    tracing::info!("  URLs: {}", config.urls.len());
    for url in &config.urls {
        tracing::info!("    - {}", url);
    }
    tracing::info!("  Run interval: {:?}", config.run_interval);
    tracing::info!("  Run timeout: {:?}", config.run_timeout);
    tracing::info!("  Topic: {}", config.topic_name);
    if let Some(email) = &config.notification_email {
        tracing::info!("  Notification email: {}", email);
    }
    if let Some(webhook) = &config.webhook_url {
        tracing::info!("  Webhook relay: {}", webhook);
    }
    if config.email_undeliverable() {
        tracing::warn!(
            "HEARTBEAT_NOTIFICATION_EMAIL is set but no HEARTBEAT_NOTIFICATION_WEBHOOK_URL relay is configured; alerts will only be logged"
        );
    }
    match config.store_kind {
        StoreKind::File => tracing::info!("  Store: file ({})", config.data_dir.display()),
        StoreKind::Memory => tracing::info!("  Store: memory"),
    }
    if let Some(addr) = config.status_addr {
        tracing::info!("  Status API: {}", addr);
    }
    if config.run_once {
        tracing::info!("  Mode: single invocation");
    } else if config.may_overlap() {
        tracing::warn!(
            "Run timeout {:?} is not shorter than run interval {:?}; invocations are serialized, so slow runs delay the next one",
            config.run_timeout,
            config.run_interval
        );
    }

    heartbeat::service::run(config).await
}
