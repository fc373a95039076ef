//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（ObjectStore、AudioEffects、SpeechCapability、RemoteSynthesis）
//! - voice_registry: 音色克隆与管理
//! - entry_store: 通用键值存储
//! - synthesis_dispatcher: 本地优先、远程兜底的合成调度
//! - error: 应用层错误定义

pub mod error;
pub mod ports;

mod entry_store;
mod synthesis_dispatcher;
mod voice_registry;

// Re-exports
pub use entry_store::{GenericEntry, KeyValueStore};
pub use error::{LocalPathStatus, VoxError};
pub use synthesis_dispatcher::{
    AudioHandle, AudioSource, DispatcherConfig, SynthesisDispatcher, SynthesisPath,
    SynthesisRequest,
};
pub use voice_registry::{VoiceRegistry, VoiceSummary};
