//! Voice Context - Value Objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VoiceError;

/// 音色唯一标识
///
/// 格式: `voice_{毫秒时间戳}_{规范化名称}`，一经分配不可变
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(String);

impl VoiceId {
    /// 由创建时间和音色名称生成标识
    ///
    /// 同一毫秒内同名克隆会得到相同标识，这是已知且接受的风险，
    /// 冲突由注册表在写入时以错误形式暴露
    pub fn generate(name: &VoiceName, at: DateTime<Utc>) -> Self {
        Self(format!("voice_{}_{}", at.timestamp_millis(), name.normalized()))
    }

    /// 解析外部传入的标识
    pub fn parse(id: impl Into<String>) -> Result<Self, VoiceError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(VoiceError::InvalidId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音色名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceName(String);

impl VoiceName {
    pub fn new(name: impl Into<String>) -> Result<Self, VoiceError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(VoiceError::InvalidName("音色名称不能为空".to_string()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 连续空白折叠为单个下划线，用于拼接标识
    pub fn normalized(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut in_whitespace = false;
        for c in self.0.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    out.push('_');
                }
                in_whitespace = true;
            } else {
                out.push(c);
                in_whitespace = false;
            }
        }
        out
    }
}

impl std::fmt::Display for VoiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_name_normalization_collapses_whitespace() {
        let name = VoiceName::new("Deep   Narrator\tVoice").unwrap();
        assert_eq!(name.normalized(), "Deep_Narrator_Voice");

        let padded = VoiceName::new(" Narrator ").unwrap();
        assert_eq!(padded.normalized(), "_Narrator_");
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(VoiceName::new("").is_err());
        assert!(VoiceName::new("   ").is_err());
        assert!(VoiceName::new("x".repeat(500)).is_ok());
    }

    #[test]
    fn test_id_format() {
        let name = VoiceName::new("Narrator").unwrap();
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let id = VoiceId::generate(&name, at);
        assert_eq!(id.as_str(), "voice_1700000000000_Narrator");
    }

    #[test]
    fn test_parse_rejects_blank_id() {
        assert!(VoiceId::parse("").is_err());
        assert_eq!(VoiceId::parse("voice_1_a").unwrap().as_str(), "voice_1_a");
    }
}
