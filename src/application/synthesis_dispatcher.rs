//! Synthesis Dispatcher - 合成调度
//!
//! 状态机:
//!
//! ```text
//! Idle ──(本地可用且离线模式)──> Attempting(Local) ──成功──> Done
//!  │                                   │
//!  │                                  失败
//!  │                                   v
//!  └──────────(其余情况)──────> Attempting(Remote) ──成功──> Done
//!                                      │
//!                                     失败──> Failed
//! ```
//!
//! 每条路径只尝试一次，不做重试，重试策略由调用方决定。

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::{LocalPathStatus, VoxError};
use crate::application::ports::{
    AudioEffectsPort, LocalVoice, RemoteAudio, RemoteSynthesisPort, RemoteSynthesisRequest,
    SpeechCapabilityPort, Utterance,
};

/// 合成请求
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    /// 音色引用（本地音色名或远程音色 ID）
    pub voice: Option<String>,
    pub speed: Option<f32>,
    pub pitch: Option<f32>,
    pub energy: Option<f32>,
    /// 仅远程模型支持的情感参数
    pub emotion: Option<String>,
    pub language: Option<String>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn with_energy(mut self, energy: f32) -> Self {
        self.energy = Some(energy);
        self
    }

    pub fn speed(&self) -> f32 {
        self.speed.unwrap_or(1.0)
    }

    pub fn pitch(&self) -> f32 {
        self.pitch.unwrap_or(1.0)
    }

    pub fn energy(&self) -> f32 {
        self.energy.unwrap_or(1.0)
    }

    /// 校验前置条件
    pub fn validate(&self) -> Result<(), VoxError> {
        if self.text.trim().is_empty() {
            return Err(VoxError::invalid_input("text must not be empty"));
        }
        for (name, value) in [
            ("speed", self.speed),
            ("pitch", self.pitch),
            ("energy", self.energy),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(VoxError::invalid_input(format!(
                        "{} must be a positive multiplier, got {}",
                        name, v
                    )));
                }
            }
        }
        Ok(())
    }
}

/// 合成路径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisPath {
    Local,
    Remote,
}

/// 可播放音频的来源
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    /// 本地引擎已直接朗读
    Spoken,
    /// 远程音频资源地址
    Locator(String),
    /// 远程返回并经过处理的音频字节
    Buffer { data: Vec<u8>, content_type: String },
}

/// 可播放音频句柄
#[derive(Debug, Clone, PartialEq)]
pub struct AudioHandle {
    pub id: Uuid,
    pub path: SynthesisPath,
    pub source: AudioSource,
    pub created_at: DateTime<Utc>,
}

impl AudioHandle {
    fn new(path: SynthesisPath, source: AudioSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            path,
            source,
            created_at: Utc::now(),
        }
    }
}

/// 调度状态
#[derive(Debug)]
enum DispatchState {
    Idle,
    Attempting(SynthesisPath),
    Done(AudioHandle),
    Failed(VoxError),
}

/// 调度器配置
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// 离线模式：允许优先使用本地引擎
    pub offline: bool,
    /// 请求未指定时使用的情感
    pub default_emotion: Option<String>,
    /// 请求未指定时使用的语言
    pub default_language: Option<String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            offline: true,
            default_emotion: None,
            default_language: None,
        }
    }
}

/// Synthesis Dispatcher
pub struct SynthesisDispatcher {
    config: DispatcherConfig,
    local: Option<Arc<dyn SpeechCapabilityPort>>,
    remote: Arc<dyn RemoteSynthesisPort>,
    effects: Arc<dyn AudioEffectsPort>,
}

impl SynthesisDispatcher {
    pub fn new(
        config: DispatcherConfig,
        local: Option<Arc<dyn SpeechCapabilityPort>>,
        remote: Arc<dyn RemoteSynthesisPort>,
        effects: Arc<dyn AudioEffectsPort>,
    ) -> Self {
        Self {
            config,
            local,
            remote,
            effects,
        }
    }

    /// 把文本合成为可播放音频
    ///
    /// 调用方放弃等待时直接丢弃 future 即可，已发出的本地/远程操作不会被取消
    pub async fn synthesize(&self, request: SynthesisRequest) -> Result<AudioHandle, VoxError> {
        request.validate()?;

        let mut local_status = self.local_path_status();
        let mut state = DispatchState::Idle;

        loop {
            state = match state {
                DispatchState::Idle => {
                    if local_status.is_none() {
                        DispatchState::Attempting(SynthesisPath::Local)
                    } else {
                        DispatchState::Attempting(SynthesisPath::Remote)
                    }
                }
                DispatchState::Attempting(SynthesisPath::Local) => {
                    match self.attempt_local(&request).await {
                        Ok(handle) => DispatchState::Done(handle),
                        Err(reason) => {
                            tracing::warn!(
                                reason = %reason,
                                "Local synthesis failed, falling back to remote"
                            );
                            local_status = Some(LocalPathStatus::Failed(reason));
                            DispatchState::Attempting(SynthesisPath::Remote)
                        }
                    }
                }
                DispatchState::Attempting(SynthesisPath::Remote) => {
                    let local = local_status
                        .clone()
                        .unwrap_or(LocalPathStatus::NotAvailable);
                    match self.attempt_remote(&request, local).await {
                        Ok(handle) => DispatchState::Done(handle),
                        Err(err) => DispatchState::Failed(err),
                    }
                }
                DispatchState::Done(handle) => {
                    tracing::info!(
                        handle_id = %handle.id,
                        path = ?handle.path,
                        text_len = request.text.len(),
                        "Synthesis completed"
                    );
                    return Ok(handle);
                }
                DispatchState::Failed(err) => {
                    tracing::warn!(error = %err, "Synthesis failed");
                    return Err(err);
                }
            };
        }
    }

    /// 本地可枚举音色，没有本地引擎时为空
    pub async fn list_available_voices(&self) -> Vec<LocalVoice> {
        match &self.local {
            Some(local) if local.is_available() => local.voices().await,
            _ => Vec::new(),
        }
    }

    /// 远程服务是否可用
    pub async fn remote_available(&self) -> bool {
        self.remote.health_check().await
    }

    /// 本地路径不可走的原因，None 表示应先尝试本地
    fn local_path_status(&self) -> Option<LocalPathStatus> {
        if !self.config.offline {
            return Some(LocalPathStatus::OfflineDisabled);
        }
        match &self.local {
            Some(local) if local.is_available() => None,
            _ => Some(LocalPathStatus::NotAvailable),
        }
    }

    async fn attempt_local(&self, request: &SynthesisRequest) -> Result<AudioHandle, String> {
        let local = self
            .local
            .as_ref()
            .ok_or_else(|| "no local speech engine".to_string())?;

        let utterance = Utterance {
            voice: request.voice.clone(),
            rate: request.speed(),
            pitch: request.pitch(),
            volume: request.energy(),
            ..Utterance::new(request.text.clone())
        };

        local
            .speak(utterance)
            .await
            .map(|()| AudioHandle::new(SynthesisPath::Local, AudioSource::Spoken))
            .map_err(|e| e.to_string())
    }

    async fn attempt_remote(
        &self,
        request: &SynthesisRequest,
        local: LocalPathStatus,
    ) -> Result<AudioHandle, VoxError> {
        let remote_request = RemoteSynthesisRequest {
            text: request.text.clone(),
            voice: request.voice.clone(),
            speed: request.speed(),
            pitch: request.pitch(),
            energy: request.energy(),
            emotion: request
                .emotion
                .clone()
                .or_else(|| self.config.default_emotion.clone()),
            language: request
                .language
                .clone()
                .or_else(|| self.config.default_language.clone()),
        };

        let audio = self
            .remote
            .synthesize(remote_request)
            .await
            .map_err(|e| VoxError::from_remote(local, e))?;

        let source = match audio {
            RemoteAudio::Locator(url) => AudioSource::Locator(url),
            RemoteAudio::Bytes { data, content_type } => AudioSource::Buffer {
                data: self.effects.normalize(data).await?,
                content_type,
            },
        };

        Ok(AudioHandle::new(SynthesisPath::Remote, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::LocalVoice;
    use crate::infrastructure::adapters::{
        FakeRemoteBehavior, FakeSpeechBehavior, FakeSpeechEngine, FakeSynthesisClient,
        PassthroughEffects,
    };

    struct Fixture {
        dispatcher: SynthesisDispatcher,
        local: Arc<FakeSpeechEngine>,
        remote: Arc<FakeSynthesisClient>,
    }

    fn fixture(offline: bool, local: FakeSpeechBehavior, remote: FakeRemoteBehavior) -> Fixture {
        let local = Arc::new(FakeSpeechEngine::new(local).with_voices(vec![LocalVoice {
            identifier: "gmw/en-US".to_string(),
            name: "English_(America)".to_string(),
            language: Some("en-us".to_string()),
        }]));
        let remote = Arc::new(FakeSynthesisClient::new(remote));
        let dispatcher = SynthesisDispatcher::new(
            DispatcherConfig {
                offline,
                ..Default::default()
            },
            Some(local.clone()),
            remote.clone(),
            Arc::new(PassthroughEffects::new()),
        );
        Fixture {
            dispatcher,
            local,
            remote,
        }
    }

    fn locator() -> FakeRemoteBehavior {
        FakeRemoteBehavior::Locator("http://api.local/static/audio/a.mp3".to_string())
    }

    #[tokio::test]
    async fn test_local_success_makes_no_network_call() {
        let f = fixture(true, FakeSpeechBehavior::Succeed, locator());

        let handle = f
            .dispatcher
            .synthesize(SynthesisRequest::new("hello").with_speed(1.5).with_energy(0.5))
            .await
            .unwrap();

        assert_eq!(handle.path, SynthesisPath::Local);
        assert_eq!(handle.source, AudioSource::Spoken);
        assert_eq!(f.remote.call_count(), 0);

        let spoken = f.local.spoken();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].text, "hello");
        assert_eq!(spoken[0].rate, 1.5);
        assert_eq!(spoken[0].pitch, 1.0);
        assert_eq!(spoken[0].volume, 0.5);
    }

    #[tokio::test]
    async fn test_local_failure_falls_back_to_remote_once() {
        let f = fixture(true, FakeSpeechBehavior::Fail("device busy".to_string()), locator());

        let handle = f.dispatcher.synthesize(SynthesisRequest::new("hello")).await.unwrap();

        assert_eq!(handle.path, SynthesisPath::Remote);
        assert_eq!(
            handle.source,
            AudioSource::Locator("http://api.local/static/audio/a.mp3".to_string())
        );
        assert_eq!(f.local.spoken().len(), 1);
        assert_eq!(f.remote.call_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_local_goes_straight_to_remote() {
        let f = fixture(true, FakeSpeechBehavior::Missing, locator());

        let handle = f.dispatcher.synthesize(SynthesisRequest::new("hello")).await.unwrap();

        assert_eq!(handle.path, SynthesisPath::Remote);
        assert!(f.local.spoken().is_empty());
        assert_eq!(f.remote.call_count(), 1);
    }

    #[tokio::test]
    async fn test_offline_disabled_skips_local() {
        let f = fixture(false, FakeSpeechBehavior::Succeed, locator());

        let request = SynthesisRequest::new("hello").with_voice("voice_1_Narrator");
        let handle = f.dispatcher.synthesize(request).await.unwrap();

        assert_eq!(handle.path, SynthesisPath::Remote);
        assert!(f.local.spoken().is_empty());

        let sent = f.remote.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].voice.as_deref(), Some("voice_1_Narrator"));
        assert_eq!(sent[0].speed, 1.0);
    }

    #[tokio::test]
    async fn test_remote_request_uses_configured_defaults() {
        let remote = Arc::new(FakeSynthesisClient::new(locator()));
        let dispatcher = SynthesisDispatcher::new(
            DispatcherConfig {
                offline: false,
                default_emotion: Some("neutral".to_string()),
                default_language: Some("en".to_string()),
            },
            None,
            remote.clone(),
            Arc::new(PassthroughEffects::new()),
        );

        let mut request = SynthesisRequest::new("bonjour");
        request.language = Some("fr".to_string());
        dispatcher.synthesize(request).await.unwrap();

        let sent = remote.requests();
        assert_eq!(sent[0].emotion.as_deref(), Some("neutral"));
        assert_eq!(sent[0].language.as_deref(), Some("fr"));
    }

    #[tokio::test]
    async fn test_no_local_engine_at_all() {
        let remote = Arc::new(FakeSynthesisClient::new(FakeRemoteBehavior::NetworkFailure));
        let dispatcher = SynthesisDispatcher::new(
            DispatcherConfig::default(),
            None,
            remote.clone(),
            Arc::new(PassthroughEffects::new()),
        );

        let err = dispatcher.synthesize(SynthesisRequest::new("hello")).await.unwrap_err();
        assert!(matches!(
            err,
            VoxError::NetworkError {
                local: LocalPathStatus::NotAvailable,
                ..
            }
        ));
        assert_eq!(remote.call_count(), 1);
        assert!(dispatcher.list_available_voices().await.is_empty());
    }

    #[tokio::test]
    async fn test_both_paths_failing_is_distinguishable() {
        let f = fixture(
            true,
            FakeSpeechBehavior::Fail("device busy".to_string()),
            FakeRemoteBehavior::ServiceFailure("HTTP 500: model not loaded".to_string()),
        );

        match f.dispatcher.synthesize(SynthesisRequest::new("hello")).await {
            Err(VoxError::SynthesisUnavailable { local, remote }) => {
                assert!(matches!(local, LocalPathStatus::Failed(ref r) if r.contains("device busy")));
                assert!(remote.contains("model not loaded"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(f.remote.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_attempts_nothing() {
        let f = fixture(true, FakeSpeechBehavior::Succeed, locator());

        for text in ["", "   "] {
            let err = f.dispatcher.synthesize(SynthesisRequest::new(text)).await.unwrap_err();
            assert!(matches!(err, VoxError::InvalidInput(_)));
        }
        assert!(f.local.spoken().is_empty());
        assert_eq!(f.remote.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_multiplier_rejected() {
        let f = fixture(true, FakeSpeechBehavior::Succeed, locator());

        let err = f
            .dispatcher
            .synthesize(SynthesisRequest::new("hello").with_pitch(0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, VoxError::InvalidInput(_)));
        assert!(f.local.spoken().is_empty());
    }

    #[tokio::test]
    async fn test_remote_bytes_become_buffer() {
        let f = fixture(false, FakeSpeechBehavior::Missing, FakeRemoteBehavior::Bytes(vec![1, 2, 3]));

        let handle = f.dispatcher.synthesize(SynthesisRequest::new("hello")).await.unwrap();
        assert_eq!(
            handle.source,
            AudioSource::Buffer {
                data: vec![1, 2, 3],
                content_type: "audio/wav".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_list_available_voices() {
        let f = fixture(true, FakeSpeechBehavior::Succeed, locator());
        let voices = f.dispatcher.list_available_voices().await;
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].identifier, "gmw/en-US");

        let f = fixture(true, FakeSpeechBehavior::Missing, locator());
        assert!(f.dispatcher.list_available_voices().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let f = fixture(true, FakeSpeechBehavior::Succeed, locator());
        let dispatcher = Arc::new(f.dispatcher);

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let dispatcher = dispatcher.clone();
            tasks.spawn(async move {
                dispatcher
                    .synthesize(SynthesisRequest::new(format!("line {}", i)))
                    .await
            });
        }

        let mut ids = std::collections::HashSet::new();
        while let Some(result) = tasks.join_next().await {
            ids.insert(result.unwrap().unwrap().id);
        }
        assert_eq!(ids.len(), 8);
        assert_eq!(f.local.spoken().len(), 8);
    }
}
