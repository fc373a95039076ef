//! HTTP Synthesis Client - 调用远程合成服务
//!
//! 实现 RemoteSynthesisPort trait，通过 HTTP 调用远程 TTS 服务
//!
//! 远程 TTS API:
//! POST {base_url}/api/tts
//! Request: text, voice_id, speed, pitch, energy, emotion, language (form)
//! Response: {"success": true, "audio_url": "/static/audio/..."} (JSON)
//!           或 audio/* 二进制
//! Error: {"detail": "..."}

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{
    RemoteAudio, RemoteError, RemoteSynthesisPort, RemoteSynthesisRequest,
};

/// 合成请求体 (form)
#[derive(Debug, Serialize)]
struct SynthesisForm<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_id: Option<&'a str>,
    speed: f32,
    pitch: f32,
    energy: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    emotion: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}

/// 合成响应体 (JSON)
#[derive(Debug, Deserialize)]
struct SynthesisResponseBody {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default, alias = "audioUrl")]
    audio_url: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// 错误响应体 (JSON)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// HTTP 合成客户端配置
#[derive(Debug, Clone)]
pub struct HttpSynthesisClientConfig {
    /// 远程服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSynthesisClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpSynthesisClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 合成客户端
pub struct HttpSynthesisClient {
    client: Client,
    config: HttpSynthesisClientConfig,
}

impl HttpSynthesisClient {
    /// 创建新的 HTTP 合成客户端
    pub fn new(config: HttpSynthesisClientConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// 获取合成 URL
    fn synthesis_url(&self) -> String {
        format!("{}/api/tts", self.base_url())
    }

    /// 获取健康检查 URL
    fn status_url(&self) -> String {
        format!("{}/api/status", self.base_url())
    }

    /// 把服务返回的相对地址解析为绝对地址
    fn resolve_locator(&self, audio_url: &str) -> Result<String, RemoteError> {
        let base = Url::parse(&format!("{}/", self.base_url()))
            .map_err(|e| RemoteError::InvalidResponse(format!("Invalid base URL: {}", e)))?;
        base.join(audio_url)
            .map(|url| url.to_string())
            .map_err(|e| RemoteError::InvalidResponse(format!("Invalid audio URL: {}", e)))
    }
}

fn map_transport_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else if e.is_connect() {
        RemoteError::NetworkError(format!("Cannot connect to synthesis service: {}", e))
    } else {
        RemoteError::NetworkError(e.to_string())
    }
}

/// 读取响应体时的错误：连接中断归为传输失败，内容无法解析归为无效响应
fn map_body_error(e: reqwest::Error) -> RemoteError {
    if e.is_decode() {
        RemoteError::InvalidResponse(e.to_string())
    } else if e.is_body() || e.is_timeout() || e.is_connect() {
        map_transport_error(e)
    } else {
        RemoteError::InvalidResponse(e.to_string())
    }
}

#[async_trait]
impl RemoteSynthesisPort for HttpSynthesisClient {
    async fn synthesize(
        &self,
        request: RemoteSynthesisRequest,
    ) -> Result<RemoteAudio, RemoteError> {
        let form = SynthesisForm {
            text: &request.text,
            voice_id: request.voice.as_deref(),
            speed: request.speed,
            pitch: request.pitch,
            energy: request.energy,
            emotion: request.emotion.as_deref(),
            language: request.language.as_deref(),
        };

        tracing::debug!(
            url = %self.synthesis_url(),
            text_len = request.text.len(),
            voice = ?request.voice,
            "Sending remote synthesis request"
        );

        let response = self
            .client
            .post(self.synthesis_url())
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.detail)
                .unwrap_or(body);
            return Err(RemoteError::ServiceError(format!("HTTP {}: {}", status, detail)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if content_type.starts_with("audio/") {
            let data = response
                .bytes()
                .await
                .map_err(map_body_error)?
                .to_vec();

            tracing::info!(
                content_type = %content_type,
                audio_size = data.len(),
                "Remote synthesis returned audio bytes"
            );
            return Ok(RemoteAudio::Bytes { data, content_type });
        }

        let body: SynthesisResponseBody = response
            .json()
            .await
            .map_err(map_body_error)?;

        if body.success == Some(false) {
            return Err(RemoteError::ServiceError(
                body.detail
                    .or(body.message)
                    .unwrap_or_else(|| "synthesis rejected".to_string()),
            ));
        }

        let audio_url = body.audio_url.ok_or_else(|| {
            RemoteError::InvalidResponse(
                body.detail
                    .or(body.message)
                    .unwrap_or_else(|| "response has no audio_url".to_string()),
            )
        })?;
        let locator = self.resolve_locator(&audio_url)?;

        tracing::info!(locator = %locator, "Remote synthesis completed");

        Ok(RemoteAudio::Locator(locator))
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.status_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
