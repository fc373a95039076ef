//! Remote Synthesis Port - 远程合成服务抽象
//!
//! 定义远程 TTS 服务的窄接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 远程合成错误
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// 是否属于传输层失败（连接、超时）
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::NetworkError(_) | RemoteError::Timeout)
    }
}

/// 远程合成请求
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSynthesisRequest {
    pub text: String,
    /// 远程服务注册的音色 ID
    pub voice: Option<String>,
    pub speed: f32,
    pub pitch: f32,
    pub energy: f32,
    pub emotion: Option<String>,
    pub language: Option<String>,
}

/// 远程合成结果
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteAudio {
    /// 可解析的音频资源地址
    Locator(String),
    /// 服务直接返回的音频字节
    Bytes { data: Vec<u8>, content_type: String },
}

/// Remote Synthesis Port
#[async_trait]
pub trait RemoteSynthesisPort: Send + Sync {
    /// 发起一次合成，不做重试
    async fn synthesize(&self, request: RemoteSynthesisRequest)
        -> Result<RemoteAudio, RemoteError>;

    /// 检查远程服务是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
