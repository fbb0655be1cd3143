//! Audio Storage Port - 出站端口
//!
//! 定义音频产物的存储、发布与清理接口

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::chat::AudioArtifact;

/// 音频存储错误
#[derive(Debug, Error)]
pub enum AudioStorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Audio Storage Port - 出站端口
///
/// 所有文件名都相对于音频目录
#[async_trait]
pub trait AudioStoragePort: Send + Sync {
    /// 为新请求分配产物（固定名称或唯一名称）
    fn allocate(&self, extension: &str) -> AudioArtifact;

    /// 文件的磁盘路径
    fn path_of(&self, file_name: &str) -> PathBuf;

    /// 文件的公开 URL 路径
    fn url_of(&self, file_name: &str) -> String;

    /// 写入文件，目录不存在时创建，覆盖已有内容
    async fn write(&self, file_name: &str, data: &[u8]) -> Result<PathBuf, AudioStorageError>;

    /// 原子地把 `from` 重命名为 `to`
    async fn promote(&self, from: &str, to: &str) -> Result<PathBuf, AudioStorageError>;

    /// 删除文件，文件不存在不视为错误
    async fn remove(&self, file_name: &str) -> Result<(), AudioStorageError>;

    /// 按保留策略清理旧产物，返回删除的文件数
    async fn prune(&self) -> Result<u64, AudioStorageError>;
}
