//! Sled 存储实现

mod object_store;

pub use object_store::{SledObjectStore, SledStoreConfig, StoreHandle, SCHEMA_VERSION};
