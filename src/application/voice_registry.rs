//! Voice Registry - 音色身份注册表
//!
//! 把原始音频样本和展示名称变成持久化、可唯一标识的音色资产

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::error::VoxError;
use crate::application::ports::{
    AudioEffectsPort, Collection, ObjectStorePort, RecordStoreExt, StoredRecord,
};
use crate::domain::voice::{VoiceId, VoiceName, VoiceRecord};

impl StoredRecord for VoiceRecord {
    const COLLECTION: Collection = Collection::Voices;

    fn key(&self) -> &str {
        self.id().as_str()
    }
}

/// 音色列表项
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSummary {
    pub id: VoiceId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&VoiceRecord> for VoiceSummary {
    fn from(record: &VoiceRecord) -> Self {
        Self {
            id: record.id().clone(),
            name: record.name().to_string(),
            created_at: record.created_at(),
        }
    }
}

/// Voice Registry
pub struct VoiceRegistry {
    store: Arc<dyn ObjectStorePort>,
    effects: Arc<dyn AudioEffectsPort>,
}

impl VoiceRegistry {
    pub fn new(store: Arc<dyn ObjectStorePort>, effects: Arc<dyn AudioEffectsPort>) -> Self {
        Self { store, effects }
    }

    /// 克隆音色：生成标识、归一化样本、持久化记录，返回新标识
    ///
    /// 要么完整写入一条记录，要么什么都不写。
    /// 同名同毫秒的标识冲突不会覆盖已有音色，而是返回 `WriteFailed`。
    pub async fn clone_voice(
        &self,
        audio_sample: Vec<u8>,
        name: &str,
    ) -> Result<VoiceId, VoxError> {
        let name = VoiceName::new(name)?;
        if audio_sample.is_empty() {
            return Err(VoxError::invalid_input("audio sample must not be empty"));
        }

        let normalized = self.effects.normalize(audio_sample).await?;
        let record = VoiceRecord::new(name, normalized, Utc::now())?;

        if !self.store.insert_record(&record).await? {
            return Err(VoxError::WriteFailed(format!(
                "voice id already exists: {}",
                record.id()
            )));
        }

        tracing::info!(
            voice_id = %record.id(),
            name = %record.name(),
            size_bytes = record.audio_payload().len(),
            "Voice cloned"
        );

        Ok(record.id().clone())
    }

    /// 列出当前持久化的全部音色，每次调用都重新读取存储
    pub async fn list(&self) -> Result<Vec<VoiceSummary>, VoxError> {
        let keys = self.store.list_keys(Collection::Voices).await?;
        let mut voices = Vec::with_capacity(keys.len());
        for key in keys {
            // 遍历期间被并发删除的记录直接跳过
            let record: Option<VoiceRecord> = self.store.get_record(&key).await?;
            if let Some(record) = record {
                voices.push(VoiceSummary::from(&record));
            }
        }
        voices.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(voices)
    }

    /// 读取完整音色记录
    pub async fn get(&self, id: &VoiceId) -> Result<Option<VoiceRecord>, VoxError> {
        let record: Option<VoiceRecord> = self.store.get_record(id.as_str()).await?;
        Ok(record)
    }

    /// 删除音色，不存在时为空操作
    pub async fn remove(&self, id: &VoiceId) -> Result<(), VoxError> {
        self.store.delete(Collection::Voices, id.as_str()).await?;
        tracing::info!(voice_id = %id, "Voice removed");
        Ok(())
    }
}
