//! 应用层错误定义
//!
//! 统一的错误分类，所有组件都把失败交给调用方，不做自动重试

use thiserror::Error;

use crate::application::ports::{EffectsError, RemoteError, StoreError};
use crate::domain::voice::VoiceError;

/// 本地合成路径的结局，用于区分"没有本地引擎"和"网络问题"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalPathStatus {
    /// 宿主上没有可用的本地引擎
    NotAvailable,
    /// 配置关闭了离线模式
    OfflineDisabled,
    /// 本地引擎尝试过但失败
    Failed(String),
}

impl std::fmt::Display for LocalPathStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalPathStatus::NotAvailable => f.write_str("no local speech engine"),
            LocalPathStatus::OfflineDisabled => f.write_str("offline mode disabled"),
            LocalPathStatus::Failed(reason) => write!(f, "local speech failed: {}", reason),
        }
    }
}

/// 应用层错误
#[derive(Debug, Error)]
pub enum VoxError {
    /// 调用方数据违反前置条件，立即返回
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 持久化后端不可用
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// 写入失败，原有状态保持不变
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// 本地与远程路径都已用尽
    #[error("Synthesis unavailable ({local}; remote: {remote})")]
    SynthesisUnavailable {
        local: LocalPathStatus,
        remote: String,
    },

    /// 远程路径因连接问题失败
    #[error("Network error ({local}; remote: {detail})")]
    NetworkError {
        local: LocalPathStatus,
        detail: String,
    },

    #[error("Invalid audio format: {0}")]
    InvalidAudioFormat(String),

    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },
}

impl VoxError {
    /// 创建输入校验错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 由远程失败和本地路径结局组合出最终错误
    pub fn from_remote(local: LocalPathStatus, err: RemoteError) -> Self {
        if err.is_transport() {
            Self::NetworkError {
                local,
                detail: err.to_string(),
            }
        } else {
            Self::SynthesisUnavailable {
                local,
                remote: err.to_string(),
            }
        }
    }
}

impl From<StoreError> for VoxError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::StorageUnavailable(msg),
            StoreError::WriteFailed(msg) => Self::WriteFailed(msg),
            StoreError::SerializationError(msg) => {
                Self::StorageUnavailable(format!("corrupted record: {}", msg))
            }
        }
    }
}

impl From<VoiceError> for VoxError {
    fn from(err: VoiceError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<EffectsError> for VoxError {
    fn from(err: EffectsError) -> Self {
        match err {
            EffectsError::InvalidAudioFormat(msg) => Self::InvalidAudioFormat(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failure_maps_to_network_error() {
        let err = VoxError::from_remote(
            LocalPathStatus::NotAvailable,
            RemoteError::NetworkError("connection refused".to_string()),
        );
        assert!(matches!(
            err,
            VoxError::NetworkError {
                local: LocalPathStatus::NotAvailable,
                ..
            }
        ));

        let err = VoxError::from_remote(LocalPathStatus::OfflineDisabled, RemoteError::Timeout);
        assert!(matches!(err, VoxError::NetworkError { .. }));
    }

    #[test]
    fn test_service_failure_maps_to_synthesis_unavailable() {
        let err = VoxError::from_remote(
            LocalPathStatus::Failed("engine crashed".to_string()),
            RemoteError::ServiceError("HTTP 500".to_string()),
        );
        match err {
            VoxError::SynthesisUnavailable { local, remote } => {
                assert_eq!(local, LocalPathStatus::Failed("engine crashed".to_string()));
                assert!(remote.contains("HTTP 500"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_store_errors_keep_taxonomy() {
        let err: VoxError = StoreError::WriteFailed("disk full".to_string()).into();
        assert!(matches!(err, VoxError::WriteFailed(_)));
        let err: VoxError = StoreError::Unavailable("no backend".to_string()).into();
        assert!(matches!(err, VoxError::StorageUnavailable(_)));
    }
}
