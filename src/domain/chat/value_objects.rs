//! Chat Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChatError;

/// 用户消息
///
/// 去除首尾空白后不能为空；原始文本原样转发给语言模型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage(String);

impl ChatMessage {
    pub fn new(message: impl Into<String>) -> Result<Self, ChatError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(Self(message))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语言模型回复（已去除首尾空白）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyText(String);

impl ReplyText {
    pub fn from_completion(raw: &str) -> Result<Self, ChatError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyReply);
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ReplyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音频产物标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactId {
    /// 固定名称，所有请求共享同一个槽位
    Fixed,
    /// 按请求唯一
    Unique(Uuid),
}

impl ArtifactId {
    pub fn unique() -> Self {
        Self::Unique(Uuid::new_v4())
    }

    /// 文件名主干
    pub fn stem(&self) -> String {
        match self {
            ArtifactId::Fixed => "speech".to_string(),
            ArtifactId::Unique(id) => id.simple().to_string(),
        }
    }
}

/// 音频产物
///
/// 一个产物对应三个文件名：
/// - raw: TTS 原始输出
/// - processed: 转码后的最终文件
/// - staging: 转码器写入的临时文件，成功后重命名为 processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    id: ArtifactId,
    extension: String,
}

impl AudioArtifact {
    pub fn new(id: ArtifactId, extension: impl Into<String>) -> Self {
        Self {
            id,
            extension: extension.into(),
        }
    }

    pub fn id(&self) -> ArtifactId {
        self.id
    }

    pub fn is_unique(&self) -> bool {
        matches!(self.id, ArtifactId::Unique(_))
    }

    pub fn raw_file_name(&self) -> String {
        format!("{}.{}", self.id.stem(), self.extension)
    }

    pub fn processed_file_name(&self) -> String {
        format!("{}_processed.{}", self.id.stem(), self.extension)
    }

    /// 保留扩展名，转码器按扩展名推断输出格式
    pub fn staging_file_name(&self) -> String {
        format!("{}_processed.partial.{}", self.id.stem(), self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_rejects_blank() {
        assert_eq!(ChatMessage::new(""), Err(ChatError::EmptyMessage));
        assert_eq!(ChatMessage::new("  \n\t "), Err(ChatError::EmptyMessage));
    }

    #[test]
    fn test_message_keeps_original_text() {
        let message = ChatMessage::new("  why are my eyes dry? ").unwrap();
        assert_eq!(message.as_str(), "  why are my eyes dry? ");
    }

    #[test]
    fn test_reply_is_trimmed() {
        let reply = ReplyText::from_completion("\n Blink more often. \n").unwrap();
        assert_eq!(reply.as_str(), "Blink more often.");
        assert_eq!(ReplyText::from_completion("   "), Err(ChatError::EmptyReply));
    }

    #[test]
    fn test_fixed_artifact_names() {
        let artifact = AudioArtifact::new(ArtifactId::Fixed, "mp3");
        assert!(!artifact.is_unique());
        assert_eq!(artifact.raw_file_name(), "speech.mp3");
        assert_eq!(artifact.processed_file_name(), "speech_processed.mp3");
        assert_eq!(artifact.staging_file_name(), "speech_processed.partial.mp3");
    }

    #[test]
    fn test_unique_artifacts_differ() {
        let a = AudioArtifact::new(ArtifactId::unique(), "mp3");
        let b = AudioArtifact::new(ArtifactId::unique(), "mp3");
        assert!(a.is_unique());
        assert_ne!(a.raw_file_name(), b.raw_file_name());
        assert!(a.raw_file_name().ends_with(".mp3"));
    }
}
