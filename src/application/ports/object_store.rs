//! Object Store Port - 持久化对象存储抽象
//!
//! 按命名集合划分的异步键值存储，具体实现使用 Sled

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// 对象存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 宿主环境没有可用的持久化后端，或后端读取失败
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// 写入未被后端确认，该 key 的原有状态保持不变
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 命名集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// 音色记录
    Voices,
    /// 通用键值条目
    Entries,
}

impl Collection {
    /// 当前 schema 需要的全部集合
    pub const ALL: [Collection; 2] = [Collection::Voices, Collection::Entries];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Voices => "voices",
            Collection::Entries => "entries",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Object Store Port
///
/// - 同一 key 的并发写入被串行化，最后完成的写入生效
/// - 每次 put/delete 对单个 key 是原子的
/// - 写操作只在后端确认落盘后返回成功
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// 插入或覆盖
    async fn put(&self, collection: Collection, key: &str, value: Vec<u8>)
        -> Result<(), StoreError>;

    /// 仅当 key 不存在时插入，返回是否插入成功
    async fn insert_new(
        &self,
        collection: Collection,
        key: &str,
        value: Vec<u8>,
    ) -> Result<bool, StoreError>;

    /// 读取，key 不存在时返回 `None`
    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// 删除，key 不存在时为空操作
    async fn delete(&self, collection: Collection, key: &str) -> Result<(), StoreError>;

    /// 列出集合中当前所有 key
    ///
    /// 每次调用重新读取，调用方可随时重新开始遍历
    async fn list_keys(&self, collection: Collection) -> Result<Vec<String>, StoreError>;
}

/// 可持久化记录
///
/// 记录自身携带所属集合和主键字段
pub trait StoredRecord: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn key(&self) -> &str;

    fn encode(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(self).map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        bincode::deserialize(bytes).map_err(|e| StoreError::SerializationError(e.to_string()))
    }
}

/// 以记录为单位读写的便捷方法
#[async_trait]
pub trait RecordStoreExt: ObjectStorePort {
    /// 按记录主键插入或覆盖
    async fn put_record<R: StoredRecord>(&self, record: &R) -> Result<(), StoreError> {
        let bytes = record
            .encode()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        self.put(R::COLLECTION, record.key(), bytes).await
    }

    /// 仅当主键不存在时插入
    async fn insert_record<R: StoredRecord>(&self, record: &R) -> Result<bool, StoreError> {
        let bytes = record
            .encode()
            .map_err(|e| StoreError::WriteFailed(e.to_string()))?;
        self.insert_new(R::COLLECTION, record.key(), bytes).await
    }

    async fn get_record<R: StoredRecord>(&self, key: &str) -> Result<Option<R>, StoreError> {
        match self.get(R::COLLECTION, key).await? {
            Some(bytes) => R::decode(&bytes).map(Some),
            None => Ok(None),
        }
    }
}

impl<T: ObjectStorePort + ?Sized> RecordStoreExt for T {}
