//! Environment configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::alerts::{NotifyTarget, TopicConfig};
use crate::store::FileStoreConfig;

/// Delimiter between entries of `HEARTBEAT_URLS`
pub const URL_DELIMITER: char = '$';

/// Offline store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    File,
    Memory,
}

/// Heartbeat configuration
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Monitored URLs, deduplicated, in configured order
    pub urls: Vec<String>,
    /// Period between invocations
    pub run_interval: Duration,
    /// Budget for a single invocation
    pub run_timeout: Duration,
    /// Alert destination, forwarded to webhook relays
    pub notification_email: Option<String>,
    /// Notifier topic identity
    pub topic_name: String,
    /// Webhook relay subscribed to the topic
    pub webhook_url: Option<String>,
    pub store_kind: StoreKind,
    /// Offline store table identity
    pub table_name: String,
    pub data_dir: PathBuf,
    /// Bind address of the status API, disabled when unset
    pub status_addr: Option<SocketAddr>,
    /// Run a single invocation and exit
    pub run_once: bool,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            urls: vec![],
            run_interval: Duration::from_secs(5 * 60),
            run_timeout: Duration::from_secs(60),
            notification_email: None,
            topic_name: "HeartbeatNotifications".to_string(),
            webhook_url: None,
            store_kind: StoreKind::File,
            table_name: "OfflineHeartbeats".to_string(),
            data_dir: PathBuf::from("./heartbeat_data"),
            status_addr: None,
            run_once: false,
        }
    }
}

impl HeartbeatConfig {
    /// Create a config from environment variables
    /// HEARTBEAT_URLS=https://a.example$https://b.example
    /// HEARTBEAT_RUN_INTERVAL_MINUTES=5
    /// HEARTBEAT_RUN_TIMEOUT_SECONDS=60
    /// HEARTBEAT_NOTIFICATION_EMAIL=ops@example.com
    /// HEARTBEAT_NOTIFICATION_TOPIC=HeartbeatNotifications
    /// HEARTBEAT_NOTIFICATION_WEBHOOK_URL=https://relay.example/hook
    /// HEARTBEAT_STORE=file
    /// HEARTBEAT_OFFLINE_TABLE_NAME=OfflineHeartbeats
    /// HEARTBEAT_DATA_DIR=./heartbeat_data
    /// HEARTBEAT_STATUS_ADDR=127.0.0.1:8080
    /// HEARTBEAT_RUN_ONCE=false
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let urls = parse_urls(&var("HEARTBEAT_URLS").ok_or(ConfigError::MissingUrls)?)?;

        let run_interval = match var("HEARTBEAT_RUN_INTERVAL_MINUTES") {
            Some(v) => {
                let minutes = parse_positive("HEARTBEAT_RUN_INTERVAL_MINUTES", &v)?;
                let secs = minutes
                    .checked_mul(60)
                    .ok_or_else(|| ConfigError::InvalidNumber {
                        var: "HEARTBEAT_RUN_INTERVAL_MINUTES",
                        value: v.clone(),
                    })?;
                Duration::from_secs(secs)
            }
            None => defaults.run_interval,
        };
        let run_timeout = match var("HEARTBEAT_RUN_TIMEOUT_SECONDS") {
            Some(v) => Duration::from_secs(parse_positive("HEARTBEAT_RUN_TIMEOUT_SECONDS", &v)?),
            None => defaults.run_timeout,
        };

        let store_kind = match var("HEARTBEAT_STORE").as_deref() {
            None | Some("file") => StoreKind::File,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let status_addr = var("HEARTBEAT_STATUS_ADDR")
            .map(|addr| {
                addr.parse::<SocketAddr>()
                    .map_err(|_| ConfigError::InvalidAddr(addr.clone()))
            })
            .transpose()?;

        let run_once = match var("HEARTBEAT_RUN_ONCE") {
            Some(v) => parse_flag("HEARTBEAT_RUN_ONCE", &v)?,
            None => false,
        };

        let table_name = match var("HEARTBEAT_OFFLINE_TABLE_NAME") {
            Some(name) => validate_table_name(name)?,
            None => defaults.table_name,
        };

        Ok(Self {
            urls,
            run_interval,
            run_timeout,
            notification_email: var("HEARTBEAT_NOTIFICATION_EMAIL"),
            topic_name: var("HEARTBEAT_NOTIFICATION_TOPIC").unwrap_or(defaults.topic_name),
            webhook_url: var("HEARTBEAT_NOTIFICATION_WEBHOOK_URL"),
            store_kind,
            table_name,
            data_dir: var("HEARTBEAT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            status_addr,
            run_once,
        })
    }

    /// Whether an invocation can outlive the interval that follows it
    pub fn may_overlap(&self) -> bool {
        self.run_timeout >= self.run_interval
    }

    /// An email destination is only reachable through a webhook relay
    pub fn email_undeliverable(&self) -> bool {
        self.notification_email.is_some() && self.webhook_url.is_none()
    }

    /// Notification topic with its subscribed targets
    pub fn topic(&self) -> TopicConfig {
        let mut topic = TopicConfig::new(self.topic_name.clone());
        if let Some(email) = &self.notification_email {
            topic = topic.with_email(email.clone());
        }
        if let Some(url) = &self.webhook_url {
            topic = topic.with_target(NotifyTarget::webhook(url.clone()));
        }
        topic
    }

    pub fn file_store_config(&self) -> FileStoreConfig {
        FileStoreConfig::new(&self.data_dir).with_table_name(self.table_name.clone())
    }
}

/// Split, trim and validate a delimited URL list, dropping duplicates
pub fn parse_urls(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut urls: Vec<String> = Vec::new();

    for entry in raw.split(URL_DELIMITER).map(str::trim).filter(|s| !s.is_empty()) {
        let parsed = reqwest::Url::parse(entry).map_err(|e| ConfigError::InvalidUrl {
            url: entry.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme {
                url: entry.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }

        if !urls.iter().any(|u| u == entry) {
            urls.push(entry.to_string());
        }
    }

    if urls.is_empty() {
        return Err(ConfigError::MissingUrls);
    }

    Ok(urls)
}

fn parse_positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}

/// Table names become file names under the data directory
fn validate_table_name(name: String) -> Result<String, ConfigError> {
    if name.contains(['/', '\\']) || name.contains("..") {
        return Err(ConfigError::InvalidTableName(name));
    }
    Ok(name)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("HEARTBEAT_URLS is missing or empty")]
    MissingUrls,

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported scheme {scheme} in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be true or false, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },

    #[error("Invalid offline table name {0:?}: path separators and '..' are not allowed")]
    InvalidTableName(String),

    #[error("Unknown store backend: {0}")]
    UnknownStore(String),

    #[error("Invalid status address: {0}")]
    InvalidAddr(String),
}
