//! Sled-based Object Store Implementation
//!
//! 每个命名集合对应一棵 sled tree。数据库在首次访问时惰性打开，
//! schema 版本变更时执行一次幂等、只增不删的升级。

use async_trait::async_trait;
use dashmap::DashMap;
use sled::{Db, IVec, Tree};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use crate::application::ports::{Collection, ObjectStorePort, StoreError};

/// 当前 schema 版本
pub const SCHEMA_VERSION: u32 = 1;

const META_TREE: &str = "__voxlabs_meta";
const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Sled 存储配置
#[derive(Debug, Clone)]
pub struct SledStoreConfig {
    /// 数据库路径，为 None 且非临时库时视为没有持久化后端
    pub db_path: Option<PathBuf>,
    /// 使用临时库（进程退出后删除）
    pub temporary: bool,
}

impl Default for SledStoreConfig {
    fn default() -> Self {
        Self {
            db_path: Some(PathBuf::from("data/voxlabs.sled")),
            temporary: false,
        }
    }
}

impl SledStoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            temporary: false,
        }
    }

    pub fn temporary() -> Self {
        Self {
            db_path: None,
            temporary: true,
        }
    }
}

/// 已就绪的数据库句柄
///
/// 持有时所有集合都已存在，可在并发操作间共享
#[derive(Clone)]
pub struct StoreHandle {
    db: Db,
    voices: Tree,
    entries: Tree,
    schema_version: u32,
}

impl StoreHandle {
    pub fn collection(&self, collection: Collection) -> &Tree {
        match collection {
            Collection::Voices => &self.voices,
            Collection::Entries => &self.entries,
        }
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// 数据库占用的磁盘空间（字节）
    pub fn size_on_disk(&self) -> Result<u64, StoreError> {
        self.db
            .size_on_disk()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

/// Sled 对象存储
///
/// 进程内唯一的共享资源：构造一次，首次使用时打开，之后不会被隐式关闭
pub struct SledObjectStore {
    config: SledStoreConfig,
    handle: OnceCell<StoreHandle>,
    /// 按 `集合/key` 串行化写入
    write_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SledObjectStore {
    pub fn new(config: SledStoreConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
            write_locks: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 获取就绪的数据库句柄
    ///
    /// 并发调用只会触发一次打开和升级；打开失败不会被缓存，下次访问会重试
    pub async fn open(&self) -> Result<&StoreHandle, StoreError> {
        self.handle
            .get_or_try_init(|| async { Self::open_backend(&self.config) })
            .await
    }

    fn open_backend(config: &SledStoreConfig) -> Result<StoreHandle, StoreError> {
        let db = if config.temporary {
            let mut sled_config = sled::Config::new().temporary(true);
            if let Some(path) = &config.db_path {
                sled_config = sled_config.path(path);
            }
            sled_config.open()
        } else {
            let path = config.db_path.as_ref().ok_or_else(|| {
                StoreError::Unavailable("no persistence path configured".to_string())
            })?;
            sled::open(path)
        }
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let stored_version = read_schema_version(&db)?;
        if stored_version > SCHEMA_VERSION {
            return Err(StoreError::Unavailable(format!(
                "database schema version {} is newer than supported version {}",
                stored_version, SCHEMA_VERSION
            )));
        }
        if stored_version < SCHEMA_VERSION {
            upgrade(&db, stored_version)?;
        }

        let voices = open_tree(&db, Collection::Voices)?;
        let entries = open_tree(&db, Collection::Entries)?;

        tracing::info!(
            db_path = ?config.db_path,
            temporary = config.temporary,
            schema_version = SCHEMA_VERSION,
            "SledObjectStore opened"
        );

        Ok(StoreHandle {
            db,
            voices,
            entries,
            schema_version: SCHEMA_VERSION,
        })
    }

    /// 在 key 级写锁内执行一次写操作并等待落盘
    async fn write_serialized<T, F>(
        &self,
        collection: Collection,
        key: &str,
        write: F,
    ) -> Result<T, StoreError>
    where
        F: FnOnce(&Tree) -> Result<T, StoreError>,
    {
        let handle = self.open().await?;
        let tree = handle.collection(collection);

        let lock_key = format!("{}/{}", collection.name(), key);
        let lock = self.write_locks.entry(lock_key.clone()).or_default().clone();
        let guard = lock.lock().await;

        let result = match tree.get(key.as_bytes()) {
            Ok(previous) => match write(tree) {
                Ok(value) => {
                    let flushed = tree.flush_async().await;
                    settle_write(tree, key, previous, value, flushed)
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        };

        drop(guard);
        drop(lock);
        self.write_locks
            .remove_if(&lock_key, |_, l| Arc::strong_count(l) == 1);

        result
    }
}

/// 根据落盘结果确认写入；落盘失败时把 key 恢复为写入前的值
fn settle_write<T>(
    tree: &Tree,
    key: &str,
    previous: Option<IVec>,
    value: T,
    flushed: sled::Result<usize>,
) -> Result<T, StoreError> {
    let err = match flushed {
        Ok(_) => return Ok(value),
        Err(e) => e,
    };

    let restored = match previous {
        Some(old) => tree.insert(key.as_bytes(), old).map(|_| ()),
        None => tree.remove(key.as_bytes()).map(|_| ()),
    };
    if let Err(restore_err) = restored {
        tracing::error!(key = %key, error = %restore_err, "Rolling back unflushed write failed");
    } else {
        tracing::warn!(key = %key, error = %err, "Write not flushed, previous value restored");
    }

    Err(StoreError::WriteFailed(err.to_string()))
}

fn read_schema_version(db: &Db) -> Result<u32, StoreError> {
    let meta = db
        .open_tree(META_TREE)
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    match meta
        .get(SCHEMA_VERSION_KEY)
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    {
        Some(bytes) => {
            let raw: [u8; 4] = bytes[..].try_into().map_err(|_| {
                StoreError::Unavailable("malformed schema version marker".to_string())
            })?;
            Ok(u32::from_be_bytes(raw))
        }
        None => Ok(0),
    }
}

/// 创建缺失的集合并记录新版本，只增不删，可重复执行
fn upgrade(db: &Db, from_version: u32) -> Result<(), StoreError> {
    let existing = db.tree_names();
    for collection in Collection::ALL {
        let name = collection.name();
        if !existing.iter().any(|n| &n[..] == name.as_bytes()) {
            open_tree(db, collection)?;
            tracing::debug!(collection = name, "Collection created");
        }
    }

    let meta = db
        .open_tree(META_TREE)
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_be_bytes().to_vec())
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    db.flush()
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

    tracing::info!(
        from_version = from_version,
        to_version = SCHEMA_VERSION,
        "Store schema upgraded"
    );
    Ok(())
}

fn open_tree(db: &Db, collection: Collection) -> Result<Tree, StoreError> {
    db.open_tree(collection.name())
        .map_err(|e| StoreError::Unavailable(e.to_string()))
}

#[async_trait]
impl ObjectStorePort for SledObjectStore {
    async fn put(
        &self,
        collection: Collection,
        key: &str,
        value: Vec<u8>,
    ) -> Result<(), StoreError> {
        let size = value.len();
        self.write_serialized(collection, key, |tree| {
            tree.insert(key.as_bytes(), value)
                .map(|_| ())
                .map_err(|e| StoreError::WriteFailed(e.to_string()))
        })
        .await?;

        tracing::debug!(collection = %collection, key = %key, size_bytes = size, "Record stored");
        Ok(())
    }

    async fn insert_new(
        &self,
        collection: Collection,
        key: &str,
        value: Vec<u8>,
    ) -> Result<bool, StoreError> {
        let inserted = self
            .write_serialized(collection, key, |tree| {
                tree.compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(value))
                    .map(|cas| cas.is_ok())
                    .map_err(|e| StoreError::WriteFailed(e.to_string()))
            })
            .await?;

        tracing::debug!(collection = %collection, key = %key, inserted = inserted, "Record insert-if-absent");
        Ok(inserted)
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let handle = self.open().await?;
        handle
            .collection(collection)
            .get(key.as_bytes())
            .map(|v| v.map(|ivec| ivec.to_vec()))
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<(), StoreError> {
        let removed = self
            .write_serialized(collection, key, |tree| {
                tree.remove(key.as_bytes())
                    .map(|old| old.is_some())
                    .map_err(|e| StoreError::WriteFailed(e.to_string()))
            })
            .await?;

        tracing::debug!(collection = %collection, key = %key, removed = removed, "Record deleted");
        Ok(())
    }

    async fn list_keys(&self, collection: Collection) -> Result<Vec<String>, StoreError> {
        let handle = self.open().await?;
        let mut keys = Vec::new();
        for key in handle.collection(collection).iter().keys() {
            let key = key.map_err(|e| StoreError::Unavailable(e.to_string()))?;
            let key = String::from_utf8(key.to_vec())
                .map_err(|e| StoreError::SerializationError(e.to_string()))?;
            keys.push(key);
        }
        Ok(keys)
    }
}
