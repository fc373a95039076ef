//! Persistence Layer - 数据持久化
//!
//! Sled 存储实现

pub mod sled;

pub use self::sled::{SledObjectStore, SledStoreConfig};
