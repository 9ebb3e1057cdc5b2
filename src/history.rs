use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use cnidarium::{StateDelta, StateRead, StateWrite, Storage};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::analysis::types::AnalysisResult;

/// Most recent analyses kept per user.
pub const HISTORY_LIMIT: usize = 10;

// Key prefix (no trailing slash, cnidarium convention)
const HISTORY_PREFIX: &str = "history";

fn history_key(user_id: u64) -> String {
    format!("{}/{}", HISTORY_PREFIX, user_id)
}

/// One past analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub symptoms: String,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub result: AnalysisResult,
}

impl HistoryItem {
    pub fn new(symptoms: &str, result: AnalysisResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symptoms: symptoms.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
            result,
        }
    }
}

/// Ordered, most-recent-first list capped at [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    items: Vec<HistoryItem>,
}

impl HistoryLog {
    pub fn record(&mut self, item: HistoryItem) {
        self.items.insert(0, item);
        self.items.truncate(HISTORY_LIMIT);
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("serialize history")
    }

    /// Decode a stored list, re-applying the cap in case it was written by hand.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut log: HistoryLog = serde_json::from_slice(bytes).context("deserialize history")?;
        log.items.truncate(HISTORY_LIMIT);
        Ok(log)
    }
}

/// Per-user analysis history persisted in cnidarium, one JSON key per user.
///
/// Each user's list is read from storage once and then served from memory;
/// every mutation rewrites the whole key.
pub struct HistoryStore {
    storage: Storage,
    cache: RwLock<HashMap<u64, HistoryLog>>,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let storage = Storage::load(data_dir.to_path_buf(), vec![HISTORY_PREFIX.to_string()])
            .await
            .context("Failed to init cnidarium storage")?;
        Ok(Self {
            storage,
            cache: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        })
    }

    async fn load(&self, user_id: u64) -> Result<HistoryLog> {
        {
            let cache = self.cache.read().await;
            if let Some(log) = cache.get(&user_id) {
                return Ok(log.clone());
            }
        }

        let snapshot = self.storage.latest_snapshot();
        let log = match snapshot.get_raw(&history_key(user_id)).await? {
            Some(bytes) => HistoryLog::from_json(&bytes).unwrap_or_else(|e| {
                warn!(user_id, error = %e, "discarding unreadable history");
                HistoryLog::default()
            }),
            None => HistoryLog::default(),
        };

        let mut cache = self.cache.write().await;
        Ok(cache.entry(user_id).or_insert(log).clone())
    }

    async fn persist(&self, user_id: u64, log: &HistoryLog) -> Result<()> {
        let snapshot = self.storage.latest_snapshot();
        let mut delta = StateDelta::new(snapshot);
        if log.is_empty() {
            delta.delete(history_key(user_id));
        } else {
            delta.put_raw(history_key(user_id), log.to_json()?);
        }
        self.storage.commit(delta).await?;
        Ok(())
    }

    /// All entries for a user, most recent first.
    pub async fn list(&self, user_id: u64) -> Result<Vec<HistoryItem>> {
        Ok(self.load(user_id).await?.items().to_vec())
    }

    pub async fn get(&self, user_id: u64, index: usize) -> Result<Option<HistoryItem>> {
        Ok(self.load(user_id).await?.get(index).cloned())
    }

    /// Append a successful analysis and rewrite the stored list.
    pub async fn record(
        &self,
        user_id: u64,
        symptoms: &str,
        result: AnalysisResult,
    ) -> Result<HistoryItem> {
        let _guard = self.write_lock.lock().await;
        let mut log = self.load(user_id).await?;
        let item = HistoryItem::new(symptoms, result);
        log.record(item.clone());

        self.persist(user_id, &log).await?;
        let len = log.len();
        self.cache.write().await.insert(user_id, log);
        debug!(user_id, item_id = %item.id, len, "history entry recorded");
        Ok(item)
    }

    /// Drop a user's whole history, in memory and in storage.
    pub async fn clear(&self, user_id: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let log = HistoryLog::default();
        self.persist(user_id, &log).await?;
        self.cache.write().await.insert(user_id, log);
        debug!(user_id, "history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::Confidence;

    fn result(content: &str) -> AnalysisResult {
        AnalysisResult {
            content: content.to_string(),
            confidence: Confidence::default(),
            language: "English".to_string(),
            sources: vec![],
        }
    }

    #[test]
    fn test_log_caps_at_limit_most_recent_first() {
        let mut log = HistoryLog::default();
        for i in 0..11 {
            log.record(HistoryItem::new(&format!("symptom {}", i), result("x")));
        }
        assert_eq!(log.len(), HISTORY_LIMIT);
        assert_eq!(log.items()[0].symptoms, "symptom 10");
        assert_eq!(log.items()[9].symptoms, "symptom 1");
        assert!(log.items().iter().all(|i| i.symptoms != "symptom 0"));
    }

    #[test]
    fn test_items_get_unique_ids() {
        let a = HistoryItem::new("a", result("x"));
        let b = HistoryItem::new("a", result("x"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_json_is_plain_array_with_camel_case() {
        let mut log = HistoryLog::default();
        log.record(HistoryItem::new("fever", result("body")));
        let value: serde_json::Value = serde_json::from_slice(&log.to_json().unwrap()).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["symptoms"], "fever");
        assert_eq!(array[0]["result"]["confidence"]["label"], "Low");
        assert!(array[0]["timestamp"].is_i64());
    }

    #[test]
    fn test_from_json_reapplies_cap() {
        let items: Vec<HistoryItem> = (0..15)
            .map(|i| HistoryItem::new(&i.to_string(), result("x")))
            .collect();
        let bytes = serde_json::to_vec(&items).unwrap();
        let log = HistoryLog::from_json(&bytes).unwrap();
        assert_eq!(log.len(), HISTORY_LIMIT);
        assert_eq!(log.items()[0].symptoms, "0");
    }

    #[tokio::test]
    async fn test_store_record_list_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path()).await.unwrap();

        for i in 0..11 {
            store
                .record(7, &format!("s{}", i), result(&format!("r{}", i)))
                .await
                .unwrap();
        }
        store.record(8, "other user", result("o")).await.unwrap();

        let items = store.list(7).await.unwrap();
        assert_eq!(items.len(), HISTORY_LIMIT);
        assert_eq!(items[0].symptoms, "s10");
        assert!(items.iter().all(|i| i.symptoms != "s0"));
        assert_eq!(store.get(7, 0).await.unwrap().unwrap().result.content, "r10");
        assert!(store.get(7, 10).await.unwrap().is_none());

        store.clear(7).await.unwrap();
        assert!(store.list(7).await.unwrap().is_empty());
        assert_eq!(store.list(8).await.unwrap().len(), 1);

        // Storage itself is empty, not just the cache.
        let snapshot = store.storage.latest_snapshot();
        assert!(snapshot.get_raw(&history_key(7)).await.unwrap().is_none());
        assert!(snapshot.get_raw(&history_key(8)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_reads_persisted_list_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path()).await.unwrap();
        store.record(1, "cough", result("r")).await.unwrap();

        // A fresh cache sees what was written to storage.
        store.cache.write().await.clear();
        let items = store.list(1).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].symptoms, "cough");
    }
}
