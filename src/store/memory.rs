use dashmap::DashMap;

use super::{OfflineRecord, OfflineStore, StoreError};

/// In-memory offline store
///
/// Records are lost on restart, so every URL that is down at startup is
/// reported offline again on the first run.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of offline records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl OfflineStore for MemoryStore {
    async fn get(&self, url: &str) -> Result<Option<OfflineRecord>, StoreError> {
        Ok(self
            .records
            .get(url)
            .map(|entry| OfflineRecord::new(entry.key().clone(), *entry.value())))
    }

    async fn put(&self, url: &str, timestamp: i64) -> Result<(), StoreError> {
        self.records.insert(url.to_string(), timestamp);
        Ok(())
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        self.records.remove(url);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<OfflineRecord>, StoreError> {
        let mut records: Vec<OfflineRecord> = self
            .records
            .iter()
            .map(|entry| OfflineRecord::new(entry.key().clone(), *entry.value()))
            .collect();
        records.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        assert!(store.get("https://a.example").await.unwrap().is_none());

        store.put("https://a.example", 1000).await.unwrap();
        let record = store.get("https://a.example").await.unwrap().unwrap();
        assert_eq!(record, OfflineRecord::new("https://a.example", 1000));

        store.delete("https://a.example").await.unwrap();
        assert!(store.get("https://a.example").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryStore::new();
        store.put("https://a.example", 1000).await.unwrap();
        store.put("https://a.example", 2000).await.unwrap();

        assert_eq!(store.len(), 1);
        let record = store.get("https://a.example").await.unwrap().unwrap();
        assert_eq!(record.timestamp, 2000);
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete("https://never.example").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let store = MemoryStore::new();
        store.put("https://c.example", 3).await.unwrap();
        store.put("https://a.example", 1).await.unwrap();
        store.put("https://b.example", 2).await.unwrap();

        let urls: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
    }
}
