//! Fake Speech Engine - 用于测试的本地语音能力
//!
//! 不发声，只记录收到的朗读请求

use async_trait::async_trait;
use std::sync::Mutex;

use crate::application::ports::{LocalVoice, SpeechCapabilityPort, SpeechError, Utterance};

/// Fake 引擎的行为
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeSpeechBehavior {
    /// 朗读成功
    Succeed,
    /// 朗读失败
    Fail(String),
    /// 宿主上没有本地引擎
    Missing,
}

/// Fake Speech Engine
pub struct FakeSpeechEngine {
    behavior: FakeSpeechBehavior,
    voices: Vec<LocalVoice>,
    spoken: Mutex<Vec<Utterance>>,
}

impl FakeSpeechEngine {
    pub fn new(behavior: FakeSpeechBehavior) -> Self {
        Self {
            behavior,
            voices: Vec::new(),
            spoken: Mutex::new(Vec::new()),
        }
    }

    pub fn with_voices(mut self, voices: Vec<LocalVoice>) -> Self {
        self.voices = voices;
        self
    }

    /// 已收到的朗读请求
    pub fn spoken(&self) -> Vec<Utterance> {
        self.spoken
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SpeechCapabilityPort for FakeSpeechEngine {
    fn is_available(&self) -> bool {
        self.behavior != FakeSpeechBehavior::Missing
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        if let Ok(mut spoken) = self.spoken.lock() {
            spoken.push(utterance.clone());
        }
        tracing::debug!(text_len = utterance.text.len(), "FakeSpeechEngine: speak");

        match &self.behavior {
            FakeSpeechBehavior::Succeed => Ok(()),
            FakeSpeechBehavior::Fail(reason) => Err(SpeechError::Failed(reason.clone())),
            FakeSpeechBehavior::Missing => {
                Err(SpeechError::Unavailable("fake engine missing".to_string()))
            }
        }
    }

    async fn voices(&self) -> Vec<LocalVoice> {
        if self.is_available() {
            self.voices.clone()
        } else {
            Vec::new()
        }
    }
}
