//! Heartbeat: Scheduled Uptime Monitor
//!
//! Periodically probes a fixed list of URLs and publishes an alert exactly when a
//! URL goes offline or comes back online. The only state carried between runs is
//! the offline store: a record per URL that was last seen offline.
//!
//! # Features
//!
//! - **Edge-Triggered Alerts**: notifications only on online/offline transitions
//! - **Offline Store**: in-memory or JSON-file tables keyed by URL
//! - **Topic Notifier**: fan-out to log and webhook relay targets
//! - **Scheduler**: fixed-interval invocations with a per-invocation timeout
//! - **Status API**: health, offline records and the last run report
//!
//! # Example
//!
//! ```no_run
//! use heartbeat::alerts::{TopicConfig, TopicNotifier};
//! use heartbeat::monitor::Monitor;
//! use heartbeat::probe::HttpProber;
//! use heartbeat::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let monitor = Monitor::new(
//!     vec!["https://example.com".to_string()],
//!     Arc::new(HttpProber::new()?),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(TopicNotifier::new(TopicConfig::default())),
//! );
//!
//! let report = monitor.run().await;
//! println!("Transitions: {}", report.transition_count());
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod api;
pub mod config;
pub mod monitor;
pub mod probe;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigError, HeartbeatConfig};
pub use monitor::{Monitor, MonitorError, RunReport, Transition};
pub use probe::{classify, Classification, Prober};
pub use store::{OfflineRecord, OfflineStore, StoreError};
