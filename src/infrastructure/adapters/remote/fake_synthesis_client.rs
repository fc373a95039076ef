//! Fake Synthesis Client - 用于测试的远程合成客户端
//!
//! 不发起网络请求，按配置返回固定结果并记录调用

use async_trait::async_trait;
use std::sync::Mutex;

use crate::application::ports::{
    RemoteAudio, RemoteError, RemoteSynthesisPort, RemoteSynthesisRequest,
};

/// Fake 客户端的行为
#[derive(Debug, Clone)]
pub enum FakeRemoteBehavior {
    /// 返回音频地址
    Locator(String),
    /// 返回音频字节
    Bytes(Vec<u8>),
    /// 连接失败
    NetworkFailure,
    /// 服务返回错误
    ServiceFailure(String),
}

/// Fake Synthesis Client
pub struct FakeSynthesisClient {
    behavior: FakeRemoteBehavior,
    requests: Mutex<Vec<RemoteSynthesisRequest>>,
}

impl FakeSynthesisClient {
    pub fn new(behavior: FakeRemoteBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的请求
    pub fn requests(&self) -> Vec<RemoteSynthesisRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl RemoteSynthesisPort for FakeSynthesisClient {
    async fn synthesize(
        &self,
        request: RemoteSynthesisRequest,
    ) -> Result<RemoteAudio, RemoteError> {
        tracing::debug!(
            text_len = request.text.len(),
            voice = ?request.voice,
            "FakeSynthesisClient: returning configured outcome"
        );
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        match &self.behavior {
            FakeRemoteBehavior::Locator(url) => Ok(RemoteAudio::Locator(url.clone())),
            FakeRemoteBehavior::Bytes(data) => Ok(RemoteAudio::Bytes {
                data: data.clone(),
                content_type: "audio/wav".to_string(),
            }),
            FakeRemoteBehavior::NetworkFailure => Err(RemoteError::NetworkError(
                "connection refused".to_string(),
            )),
            FakeRemoteBehavior::ServiceFailure(detail) => {
                Err(RemoteError::ServiceError(detail.clone()))
            }
        }
    }

    async fn health_check(&self) -> bool {
        !matches!(self.behavior, FakeRemoteBehavior::NetworkFailure)
    }
}
