//! Audio Transcoder Port - 音频转码抽象
//!
//! 对已落盘的音频文件做后处理（改变采样率以调整音高/语速）

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// 转码错误
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Failed to spawn transcoder: {0}")]
    SpawnFailed(String),

    #[error("Transcoder exited with {status}: {stderr}")]
    NonZeroExit { status: String, stderr: String },

    #[error("Transcoder timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Audio Transcoder Port
#[async_trait]
pub trait AudioTranscoderPort: Send + Sync {
    /// 读取 `input`，写出 `output`
    ///
    /// 失败时 `output` 的内容未定义，由调用方丢弃
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}
