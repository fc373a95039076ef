//! Speech Capability Port - 宿主平台本地语音能力
//!
//! 只暴露两件事：按给定语速/音调/音量朗读文本，以及枚举本地可用音色

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// 本地语音错误
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech engine unavailable: {0}")]
    Unavailable(String),

    #[error("Speech failed: {0}")]
    Failed(String),
}

/// 一次朗读请求
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// 本地音色名称
    pub voice: Option<String>,
    /// 语速倍率，1.0 为正常
    pub rate: f32,
    /// 音调倍率，1.0 为正常
    pub pitch: f32,
    /// 音量倍率，1.0 为正常
    pub volume: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// 本地可枚举的音色
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalVoice {
    /// 引擎内部使用的标识
    pub identifier: String,
    /// 展示名称
    pub name: String,
    /// 语言代码
    pub language: Option<String>,
}

/// Speech Capability Port
#[async_trait]
pub trait SpeechCapabilityPort: Send + Sync {
    /// 当前宿主上本地引擎是否可用
    fn is_available(&self) -> bool;

    /// 朗读文本，朗读结束后返回
    ///
    /// 这是可观察的副作用（会发出声音），调用方不应抑制
    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError>;

    /// 枚举本地音色，无法枚举时返回空列表
    async fn voices(&self) -> Vec<LocalVoice>;
}
