//! Key-Value Store - 通用键值存储门面
//!
//! 在 `entries` 集合上按 key 保存任意可序列化数据

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::error::VoxError;
use crate::application::ports::{
    Collection, ObjectStorePort, RecordStoreExt, StoredRecord,
};

/// 通用条目
///
/// data 以 JSON 文本保存，保证任意 serde 值都能按结构还原
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericEntry {
    pub key: String,
    pub data: String,
    pub timestamp: DateTime<Utc>,
}

impl StoredRecord for GenericEntry {
    const COLLECTION: Collection = Collection::Entries;

    fn key(&self) -> &str {
        &self.key
    }
}

/// Key-Value Store
pub struct KeyValueStore {
    store: Arc<dyn ObjectStorePort>,
}

impl KeyValueStore {
    pub fn new(store: Arc<dyn ObjectStorePort>) -> Self {
        Self { store }
    }

    /// 保存数据，每次保存都刷新写入时间
    pub async fn save<T>(&self, key: &str, data: &T) -> Result<(), VoxError>
    where
        T: Serialize + Sync + ?Sized,
    {
        validate_key(key)?;
        let data = serde_json::to_string(data)
            .map_err(|e| VoxError::invalid_input(format!("data is not serializable: {}", e)))?;

        let entry = GenericEntry {
            key: key.to_string(),
            data,
            timestamp: Utc::now(),
        };
        self.store.put_record(&entry).await?;

        tracing::debug!(key = %key, "Entry saved");
        Ok(())
    }

    /// 读取数据，key 不存在时返回 `None`
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, VoxError> {
        let Some(entry) = self.load_entry(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&entry.data).map(Some).map_err(|e| {
            VoxError::invalid_input(format!(
                "entry {} does not match the requested type: {}",
                key, e
            ))
        })
    }

    /// 读取原始条目（含写入时间）
    pub async fn load_entry(&self, key: &str) -> Result<Option<GenericEntry>, VoxError> {
        validate_key(key)?;
        let entry: Option<GenericEntry> = self.store.get_record(key).await?;
        Ok(entry)
    }

    /// 删除，key 不存在时为空操作
    pub async fn delete(&self, key: &str) -> Result<(), VoxError> {
        validate_key(key)?;
        self.store.delete(Collection::Entries, key).await?;
        tracing::debug!(key = %key, "Entry deleted");
        Ok(())
    }

    /// 列出全部 key
    pub async fn list(&self) -> Result<Vec<String>, VoxError> {
        Ok(self.store.list_keys(Collection::Entries).await?)
    }
}

fn validate_key(key: &str) -> Result<(), VoxError> {
    if key.is_empty() {
        return Err(VoxError::invalid_input("key must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::{SledObjectStore, SledStoreConfig};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Preferences {
        volume: f32,
        favorite_voices: Vec<String>,
        theme: Option<String>,
    }

    fn kv_store() -> KeyValueStore {
        KeyValueStore::new(SledObjectStore::new(SledStoreConfig::temporary()).arc())
    }

    #[tokio::test]
    async fn test_save_then_load_returns_equal_value() {
        let kv = kv_store();
        let prefs = Preferences {
            volume: 0.75,
            favorite_voices: vec!["voice_1_Narrator".to_string()],
            theme: None,
        };

        kv.save("prefs", &prefs).await.unwrap();
        let loaded: Preferences = kv.load("prefs").await.unwrap().unwrap();
        assert_eq!(loaded, prefs);

        let value = json!({ "nested": { "list": [1, 2, 3] }, "flag": true });
        kv.save("raw", &value).await.unwrap();
        let loaded: serde_json::Value = kv.load("raw").await.unwrap().unwrap();
        assert_eq!(loaded, value);
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let kv = kv_store();
        let loaded: Option<Preferences> = kv.load("never-saved").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let kv = kv_store();
        kv.save("draft", "hello").await.unwrap();

        kv.delete("draft").await.unwrap();
        let after_first = kv.list().await.unwrap();
        kv.delete("draft").await.unwrap();
        let after_second = kv.list().await.unwrap();

        assert_eq!(after_first, after_second);
        let loaded: Option<String> = kv.load("draft").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_refreshes_timestamp() {
        let kv = kv_store();
        kv.save("counter", &1).await.unwrap();
        let first = kv.load_entry("counter").await.unwrap().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        kv.save("counter", &2).await.unwrap();
        let second = kv.load_entry("counter").await.unwrap().unwrap();

        assert!(second.timestamp > first.timestamp);
        assert_eq!(second.data, "2");
    }

    #[tokio::test]
    async fn test_list_and_empty_key() {
        let kv = kv_store();
        kv.save("a", &1).await.unwrap();
        kv.save("b", &2).await.unwrap();

        let mut keys = kv.list().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);

        assert!(matches!(kv.save("", &1).await, Err(VoxError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_type_mismatch_is_reported() {
        let kv = kv_store();
        kv.save("number", &42).await.unwrap();
        let result: Result<Option<Preferences>, _> = kv.load("number").await;
        assert!(matches!(result, Err(VoxError::InvalidInput(_))));
    }
}
