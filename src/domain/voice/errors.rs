//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("无效的音色标识: {0:?}")]
    InvalidId(String),

    #[error("无效的音色名称: {0}")]
    InvalidName(String),

    #[error("无效的参考音频: {0}")]
    InvalidReferenceAudio(String),
}
