//! 应用层错误定义
//!
//! 统一的命令错误类型

use thiserror::Error;

use crate::application::ports::{AudioStorageError, LlmError, TranscodeError, TtsError};
use crate::domain::chat::ChatError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("{0}")]
    ValidationError(String),

    /// 上游服务错误（语言模型 / 语音合成）
    #[error("{message}")]
    UpstreamServiceError {
        status: Option<u16>,
        message: String,
    },

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 外部进程错误
    #[error("Process error: {0}")]
    ProcessError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建上游错误
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::UpstreamServiceError {
            status,
            message: message.into(),
        }
    }
}

impl From<ChatError> for ApplicationError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => Self::ValidationError(err.to_string()),
            ChatError::EmptyReply => Self::upstream(None, err.to_string()),
        }
    }
}

impl From<LlmError> for ApplicationError {
    fn from(err: LlmError) -> Self {
        Self::upstream(err.status(), err.to_string())
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        Self::upstream(err.status(), err.to_string())
    }
}

impl From<AudioStorageError> for ApplicationError {
    fn from(err: AudioStorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<TranscodeError> for ApplicationError {
    fn from(err: TranscodeError) -> Self {
        Self::ProcessError(err.to_string())
    }
}
