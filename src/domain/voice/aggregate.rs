//! Voice Context - Aggregate Root

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{VoiceError, VoiceId, VoiceName};

/// 音色记录聚合根
///
/// 不变量:
/// - id 非空，创建后不可变
/// - audio_payload 非空
/// - created_at 只在创建时设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceRecord {
    id: VoiceId,
    name: VoiceName,
    audio_payload: Vec<u8>,
    created_at: DateTime<Utc>,
}

impl VoiceRecord {
    /// 创建新的音色记录，标识由名称和创建时间生成
    pub fn new(
        name: VoiceName,
        audio_payload: Vec<u8>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, VoiceError> {
        if audio_payload.is_empty() {
            return Err(VoiceError::InvalidReferenceAudio(
                "参考音频不能为空".to_string(),
            ));
        }
        Ok(Self {
            id: VoiceId::generate(&name, created_at),
            name,
            audio_payload,
            created_at,
        })
    }

    // Getters
    pub fn id(&self) -> &VoiceId {
        &self.id
    }

    pub fn name(&self) -> &VoiceName {
        &self.name
    }

    pub fn audio_payload(&self) -> &[u8] {
        &self.audio_payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// ISO-8601 格式的创建时间
    pub fn created_at_iso(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
