//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（voxlabs.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["voxlabs", "voxlabs.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `VOXLABS_STORE__PATH=/var/lib/voxlabs`
/// - `VOXLABS_SYNTHESIS__OFFLINE=false`
/// - `VOXLABS_SYNTHESIS__API_URL=http://tts-server:8000`
/// - `VOXLABS_SPEECH__PROGRAM=/usr/bin/espeak-ng`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("store.path", "data/voxlabs.sled")?
        .set_default("store.temporary", false)?
        .set_default("synthesis.offline", true)?
        .set_default("synthesis.api_url", "http://localhost:8000")?
        .set_default("synthesis.timeout_secs", 120)?
        .set_default("synthesis.default_emotion", "neutral")?
        .set_default("synthesis.default_language", "en")?
        .set_default("speech.enabled", true)?
        .set_default("speech.program", "espeak-ng")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 例如: VOXLABS_SYNTHESIS__API_URL=http://tts-server:8000
    builder = builder.add_source(
        Environment::with_prefix("VOXLABS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if !config.store.temporary && config.store.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Store path cannot be empty".to_string(),
        ));
    }

    if config.synthesis.api_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Synthesis API URL cannot be empty".to_string(),
        ));
    }

    if config.synthesis.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Synthesis timeout cannot be 0".to_string(),
        ));
    }

    if config.speech.enabled && config.speech.program.is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech program cannot be empty when speech is enabled".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::debug!("=== Application Configuration ===");
    if config.store.temporary {
        tracing::debug!("Store: temporary");
    } else {
        tracing::debug!("Store: {:?}", config.store.path);
    }
    tracing::debug!("Offline Mode: {}", config.synthesis.offline);
    tracing::debug!("Synthesis API: {}", config.synthesis.api_url);
    tracing::debug!("Synthesis Timeout: {}s", config.synthesis.timeout_secs);
    tracing::debug!("Local Speech: {} ({})", config.speech.enabled, config.speech.program);
    tracing::debug!("Log Level: {}", config.log.level);
    tracing::debug!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_api_url() {
        let mut config = AppConfig::default();
        config.synthesis.api_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_timeout() {
        let mut config = AppConfig::default();
        config.synthesis.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_speech_program() {
        let mut config = AppConfig::default();
        config.speech.program = String::new();
        assert!(validate_config(&config).is_err());

        config.speech.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxlabs.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[store]\ntemporary = true\n\n[synthesis]\noffline = false\napi_url = \"http://tts:9000\"\n\n[speech]\nprogram = \"espeak\""
        )
        .unwrap();

        let config = load_config_from_path(Some(&path)).unwrap();
        assert!(config.store.temporary);
        assert!(!config.synthesis.offline);
        assert_eq!(config.synthesis.api_url, "http://tts:9000");
        assert_eq!(config.synthesis.timeout_secs, 120);
        assert_eq!(config.speech.program, "espeak");
        assert_eq!(config.synthesis.default_language.as_deref(), Some("en"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from_path(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
