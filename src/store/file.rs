//! JSON file backend for the offline store

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{OfflineRecord, OfflineStore, StoreError};

/// File store configuration
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Directory holding the table files
    pub data_dir: PathBuf,
    /// Table identity; the table lives in `<data_dir>/<table_name>.json`
    pub table_name: String,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./heartbeat_data"),
            table_name: "OfflineHeartbeats".to_string(),
        }
    }
}

impl FileStoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    fn table_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.table_name))
    }
}

/// Offline store persisted as a single JSON table file
///
/// The whole table is rewritten after every mutation. Writes land in a temp file
/// that is renamed over the table, so the file on disk is always complete.
pub struct FileStore {
    config: FileStoreConfig,
    records: Mutex<BTreeMap<String, i64>>,
}

impl FileStore {
    /// Open a table, creating the data directory if needed. A missing table file
    /// is an empty table.
    pub fn open(config: FileStoreConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.data_dir)?;

        let records = load_table(&config)?;
        tracing::debug!(
            table = %config.table_name,
            records = records.len(),
            "Offline table loaded"
        );

        Ok(Self {
            config,
            records: Mutex::new(records),
        })
    }

    /// Path of the backing table file
    pub fn path(&self) -> PathBuf {
        self.config.table_path()
    }

    /// Apply a mutation, persisting before it becomes visible
    fn mutate<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, i64>) -> bool,
    {
        let mut records = self.records.lock();
        let mut next = records.clone();
        if !apply(&mut next) {
            return Ok(());
        }

        write_table(&self.config, &next)?;
        *records = next;
        Ok(())
    }
}

#[async_trait::async_trait]
impl OfflineStore for FileStore {
    async fn get(&self, url: &str) -> Result<Option<OfflineRecord>, StoreError> {
        let records = self.records.lock();
        Ok(records
            .get(url)
            .map(|timestamp| OfflineRecord::new(url, *timestamp)))
    }

    async fn put(&self, url: &str, timestamp: i64) -> Result<(), StoreError> {
        self.mutate(|records| {
            records.insert(url.to_string(), timestamp);
            true
        })
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        self.mutate(|records| records.remove(url).is_some())
    }

    async fn list(&self) -> Result<Vec<OfflineRecord>, StoreError> {
        let records = self.records.lock();
        Ok(records
            .iter()
            .map(|(url, timestamp)| OfflineRecord::new(url.clone(), *timestamp))
            .collect())
    }
}

fn load_table(config: &FileStoreConfig) -> Result<BTreeMap<String, i64>, StoreError> {
    let path = config.table_path();
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let raw = fs::read_to_string(&path)?;
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let rows: Vec<OfflineRecord> =
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupted {
            table: config.table_name.clone(),
            reason: e.to_string(),
        })?;

    let mut records = BTreeMap::new();
    for row in rows {
        if records.insert(row.url.clone(), row.timestamp).is_some() {
            return Err(StoreError::Corrupted {
                table: config.table_name.clone(),
                reason: format!("duplicate record for {}", row.url),
            });
        }
    }

    Ok(records)
}

fn write_table(config: &FileStoreConfig, records: &BTreeMap<String, i64>) -> Result<(), StoreError> {
    let rows: Vec<OfflineRecord> = records
        .iter()
        .map(|(url, timestamp)| OfflineRecord::new(url.clone(), *timestamp))
        .collect();
    let data =
        serde_json::to_vec_pretty(&rows).map_err(|e| StoreError::Serialization(e.to_string()))?;

    let path = config.table_path();
    let tmp_path = path.with_extension("json.tmp");

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;
    file.write_all(&data)?;
    file.sync_all()?;

    fs::rename(&tmp_path, &path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> FileStore {
        FileStore::open(FileStoreConfig::new(dir.path()).with_table_name("offline")).unwrap()
    }

    #[tokio::test]
    async fn test_missing_table_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        assert!(store.list().await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let store = open_store(&dir);
            store.put("https://a.example", 1000).await.unwrap();
            store.put("https://b.example", 2000).await.unwrap();
            store.delete("https://a.example").await.unwrap();
        }

        let store = open_store(&dir);
        assert!(store.get("https://a.example").await.unwrap().is_none());
        assert_eq!(
            store.get("https://b.example").await.unwrap(),
            Some(OfflineRecord::new("https://b.example", 2000))
        );
    }

    #[tokio::test]
    async fn test_table_layout() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.put("https://a.example", 1234).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            rows,
            serde_json::json!([{ "url": "https://a.example", "timestamp": 1234 }])
        );
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        assert!(store.delete("https://never.example").await.is_ok());
        // Nothing changed, so nothing was written
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupted_table() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("offline.json"), "{not json").unwrap();

        let result = FileStore::open(FileStoreConfig::new(dir.path()).with_table_name("offline"));
        assert!(matches!(result, Err(StoreError::Corrupted { .. })));
    }

    #[test]
    fn test_duplicate_rows_rejected() {
        let dir = TempDir::new().unwrap();
        let rows = serde_json::json!([
            { "url": "https://a.example", "timestamp": 1 },
            { "url": "https://a.example", "timestamp": 2 }
        ]);
        std::fs::write(dir.path().join("offline.json"), rows.to_string()).unwrap();

        let result = FileStore::open(FileStoreConfig::new(dir.path()).with_table_name("offline"));
        assert!(matches!(result, Err(StoreError::Corrupted { .. })));
    }
}
