//! Command Speech Engine - 调用宿主上的 espeak-ng 朗读文本
//!
//! 实现 SpeechCapabilityPort：
//! - speak: `espeak-ng -s <wpm> -p <pitch> -a <amplitude> [-v <voice>] -- <text>`
//! - voices: 解析 `espeak-ng --voices` 的表格输出

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::application::ports::{LocalVoice, SpeechCapabilityPort, SpeechError, Utterance};

/// espeak-ng 的默认语速（每分钟词数）
const BASE_WORDS_PER_MINUTE: f32 = 175.0;
/// espeak-ng 的默认音调（0-99）
const BASE_PITCH: f32 = 50.0;
/// espeak-ng 的默认音量（0-200）
const BASE_AMPLITUDE: f32 = 100.0;

/// 命令行语音引擎配置
#[derive(Debug, Clone)]
pub struct CommandSpeechConfig {
    /// 可执行文件名或路径
    pub program: String,
    /// 未指定音色时使用的默认音色
    pub default_voice: Option<String>,
}

impl Default for CommandSpeechConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            default_voice: None,
        }
    }
}

/// 命令行语音引擎
pub struct CommandSpeechEngine {
    config: CommandSpeechConfig,
    /// 解析到的可执行文件，None 表示宿主上没有该引擎
    executable: Option<PathBuf>,
}

impl CommandSpeechEngine {
    pub fn new(config: CommandSpeechConfig) -> Self {
        let executable = resolve_executable(&config.program);
        tracing::info!(
            program = %config.program,
            available = executable.is_some(),
            "CommandSpeechEngine initialized"
        );
        Self { config, executable }
    }

    fn executable(&self) -> Result<&Path, SpeechError> {
        self.executable.as_deref().ok_or_else(|| {
            SpeechError::Unavailable(format!("'{}' not found on PATH", self.config.program))
        })
    }

    /// 把倍率参数换算成命令行参数
    fn speak_args(&self, utterance: &Utterance) -> Vec<String> {
        let wpm = (BASE_WORDS_PER_MINUTE * utterance.rate).round().clamp(80.0, 450.0);
        let pitch = (BASE_PITCH * utterance.pitch).round().clamp(0.0, 99.0);
        let amplitude = (BASE_AMPLITUDE * utterance.volume).round().clamp(0.0, 200.0);

        let mut args = vec![
            "-s".to_string(),
            format!("{}", wpm as u32),
            "-p".to_string(),
            format!("{}", pitch as u32),
            "-a".to_string(),
            format!("{}", amplitude as u32),
        ];
        if let Some(voice) = utterance.voice.as_ref().or(self.config.default_voice.as_ref()) {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        args.push("--".to_string());
        args.push(utterance.text.clone());
        args
    }
}

#[async_trait]
impl SpeechCapabilityPort for CommandSpeechEngine {
    fn is_available(&self) -> bool {
        self.executable.is_some()
    }

    async fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        let executable = self.executable()?;
        let args = self.speak_args(&utterance);

        tracing::debug!(
            program = %executable.display(),
            text_len = utterance.text.len(),
            voice = ?utterance.voice,
            "Speaking utterance"
        );

        let output = Command::new(executable)
            .args(&args)
            .output()
            .await
            .map_err(|e| SpeechError::Failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::Failed(format!(
                "{} exited with {}: {}",
                self.config.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    async fn voices(&self) -> Vec<LocalVoice> {
        let Ok(executable) = self.executable() else {
            return Vec::new();
        };

        match Command::new(executable).arg("--voices").output().await {
            Ok(output) if output.status.success() => {
                parse_voice_table(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                tracing::warn!(status = %output.status, "Listing local voices failed");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Listing local voices failed");
                Vec::new()
            }
        }
    }
}

/// 解析 `--voices` 输出
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
fn parse_voice_table(output: &str) -> Vec<LocalVoice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 5 {
                return None;
            }
            Some(LocalVoice {
                identifier: cols[4].to_string(),
                name: cols[3].to_string(),
                language: Some(cols[1].to_string()),
            })
        })
        .collect()
}

/// 在 PATH 中查找可执行文件，显式路径则直接检查
fn resolve_executable(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(program: &str) -> CommandSpeechEngine {
        CommandSpeechEngine::new(CommandSpeechConfig {
            program: program.to_string(),
            default_voice: Some("en-us".to_string()),
        })
    }

    #[test]
    fn test_parse_voice_table() {
        let output = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                      5  af              --/M      Afrikaans          gmw/af\n \
                      5  en-us           --/M      English_(America)  gmw/en-US            (en 3)\n";
        let voices = parse_voice_table(output);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].identifier, "gmw/af");
        assert_eq!(voices[0].name, "Afrikaans");
        assert_eq!(voices[1].language.as_deref(), Some("en-us"));
    }

    #[test]
    fn test_speak_args_scale_multipliers() {
        let engine = engine_with("definitely-not-a-speech-engine");
        let utterance = Utterance {
            text: "hello".to_string(),
            voice: None,
            rate: 2.0,
            pitch: 0.5,
            volume: 1.0,
        };
        let args = engine.speak_args(&utterance);
        assert_eq!(
            args,
            vec!["-s", "350", "-p", "25", "-a", "100", "-v", "en-us", "--", "hello"]
        );
    }

    #[tokio::test]
    async fn test_missing_engine_is_unavailable() {
        let engine = engine_with("definitely-not-a-speech-engine");
        assert!(!engine.is_available());
        assert!(engine.voices().await.is_empty());

        let result = engine.speak(Utterance::new("hello")).await;
        assert!(matches!(result, Err(SpeechError::Unavailable(_))));
    }
}
