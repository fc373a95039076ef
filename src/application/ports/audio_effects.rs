//! Audio Effects Port - 音频效果处理
//!
//! 位于"采集音频"与"存储/播放音频"之间的单一变换阶段。
//! 当前实现为直通，接口允许后续接入真实的重采样/变调而无需修改调用方。

use async_trait::async_trait;
use thiserror::Error;

/// 音效处理错误
#[derive(Debug, Error)]
pub enum EffectsError {
    /// 无法解析输入音频（保留给真实的处理实现）
    #[error("Invalid audio format: {0}")]
    InvalidAudioFormat(String),
}

/// 音效参数，未设置的参数表示不变
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioEffects {
    pub speed: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
}

impl AudioEffects {
    /// 是否所有参数都等价于"不变"
    pub fn is_identity(&self) -> bool {
        [self.speed, self.pitch, self.volume]
            .iter()
            .all(|p| p.map_or(true, |v| v == 1.0))
    }
}

/// Audio Effects Port
#[async_trait]
pub trait AudioEffectsPort: Send + Sync {
    /// 应用速度/音调/音量变换，返回同一逻辑格式的音频
    async fn apply_effects(
        &self,
        buffer: Vec<u8>,
        effects: AudioEffects,
    ) -> Result<Vec<u8>, EffectsError>;

    /// 音量归一化
    async fn normalize(&self, buffer: Vec<u8>) -> Result<Vec<u8>, EffectsError>;
}
