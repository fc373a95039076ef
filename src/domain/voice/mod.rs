//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 音色身份生成
//! - 参考音频与元数据

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::VoiceRecord;
pub use errors::VoiceError;
pub use value_objects::{VoiceId, VoiceName};
