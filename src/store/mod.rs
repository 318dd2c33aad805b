//! Offline store
//!
//! Durable record of which URLs are currently considered offline. A record for a
//! URL exists if and only if that URL was last observed offline.

pub mod file;
pub mod memory;

pub use file::{FileStore, FileStoreConfig};
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};

/// Marker that a URL was last observed offline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineRecord {
    /// Monitored URL (key)
    pub url: String,
    /// When the offline transition was observed (epoch ms)
    pub timestamp: i64,
}

impl OfflineRecord {
    pub fn new(url: impl Into<String>, timestamp: i64) -> Self {
        Self {
            url: url.into(),
            timestamp,
        }
    }
}

/// Key-value store of offline records, keyed by URL
#[async_trait::async_trait]
pub trait OfflineStore: Send + Sync {
    /// Look up the record for a URL
    async fn get(&self, url: &str) -> Result<Option<OfflineRecord>, StoreError>;

    /// Create or overwrite the record for a URL
    async fn put(&self, url: &str, timestamp: i64) -> Result<(), StoreError>;

    /// Remove the record for a URL. Removing an absent record is not an error.
    async fn delete(&self, url: &str) -> Result<(), StoreError>;

    /// All records, sorted by URL
    async fn list(&self) -> Result<Vec<OfflineRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupted table {table}: {reason}")]
    Corrupted { table: String, reason: String },
}
