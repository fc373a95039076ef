//! Domain Layer - 领域层
//!
//! 限界上下文:
//! - Voice Context: 音色资产管理

pub mod voice;
