//! TTS Engine Port - 语音合成抽象
//!
//! 定义 TTS 的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Speech synthesis request timed out")]
    Timeout,

    #[error("{message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl TtsError {
    /// 上游 HTTP 状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            TtsError::ServiceError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 语音合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// 要合成的文本内容
    pub text: String,
}

/// 语音合成响应
#[derive(Debug, Clone)]
pub struct SpeechResponse {
    /// 音频数据
    pub audio_data: Vec<u8>,
    /// 上游声明的 Content-Type
    pub content_type: Option<String>,
}

/// TTS Engine Port
///
/// 外部 TTS 服务的抽象接口
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 合成语音
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechResponse, TtsError>;

    /// 产物文件扩展名
    fn file_extension(&self) -> &str {
        "mp3"
    }
}
