//! VoxLabs - 客户端音色资产管理与语音合成调度
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Context: 音色身份与参考音频
//!
//! 应用层 (application/):
//! - Ports: 端口定义（ObjectStore, AudioEffects, SpeechCapability, RemoteSynthesis）
//! - VoiceRegistry: 音色克隆、列举、删除
//! - KeyValueStore: 通用键值存储门面
//! - SynthesisDispatcher: 本地优先、远程兜底的合成调度状态机
//!
//! 基础设施层 (infrastructure/):
//! - Persistence: Sled 对象存储（带 schema 版本与升级）
//! - Adapters: 音效直通、命令行语音引擎、HTTP 远程合成客户端及其 Fake 实现

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{
    KeyValueStore, SynthesisDispatcher, SynthesisRequest, VoiceRegistry, VoxError,
};
pub use config::{load_config, AppConfig};
