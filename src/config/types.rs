//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 存储配置
    #[serde(default)]
    pub store: StoreConfig,

    /// 合成调度配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 本地语音引擎配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// sled 数据库目录
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// 使用临时数据库（进程退出后丢弃）
    #[serde(default)]
    pub temporary: bool,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/voxlabs.sled")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            temporary: false,
        }
    }
}

/// 合成调度配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// 离线模式：本地引擎可用时优先使用
    #[serde(default = "default_offline")]
    pub offline: bool,

    /// 远程合成服务基础 URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// 默认情感
    #[serde(default = "default_emotion")]
    pub default_emotion: Option<String>,

    /// 默认语言
    #[serde(default = "default_language")]
    pub default_language: Option<String>,
}

fn default_offline() -> bool {
    true
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_emotion() -> Option<String> {
    Some("neutral".to_string())
}

fn default_language() -> Option<String> {
    Some("en".to_string())
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            offline: default_offline(),
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            default_emotion: default_emotion(),
            default_language: default_language(),
        }
    }
}

/// 本地语音引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// 是否启用本地引擎
    #[serde(default = "default_speech_enabled")]
    pub enabled: bool,

    /// 可执行文件名或路径
    #[serde(default = "default_program")]
    pub program: String,

    /// 默认音色
    #[serde(default)]
    pub default_voice: Option<String>,
}

fn default_speech_enabled() -> bool {
    true
}

fn default_program() -> String {
    "espeak-ng".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: default_speech_enabled(),
            program: default_program(),
            default_voice: None,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
