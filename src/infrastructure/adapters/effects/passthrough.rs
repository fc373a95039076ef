//! Passthrough Audio Effects - 直通音效处理
//!
//! 不做任何 DSP，原样返回输入音频

use async_trait::async_trait;

use crate::application::ports::{AudioEffects, AudioEffectsPort, EffectsError};

/// 直通音效处理器
#[derive(Debug, Clone, Default)]
pub struct PassthroughEffects;

impl PassthroughEffects {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioEffectsPort for PassthroughEffects {
    async fn apply_effects(
        &self,
        buffer: Vec<u8>,
        effects: AudioEffects,
    ) -> Result<Vec<u8>, EffectsError> {
        if !effects.is_identity() {
            tracing::debug!(
                speed = ?effects.speed,
                pitch = ?effects.pitch,
                volume = ?effects.volume,
                size_bytes = buffer.len(),
                "Effects requested, passthrough leaves audio unchanged"
            );
        }
        Ok(buffer)
    }

    async fn normalize(&self, buffer: Vec<u8>) -> Result<Vec<u8>, EffectsError> {
        Ok(buffer)
    }
}
