//! Chat Commands - 对话相关命令

/// 发送消息命令
#[derive(Debug, Clone)]
pub struct SendChatCommand {
    pub message: String,
}

/// 发送消息响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendChatResponse {
    /// 语言模型回复（已 trim）
    pub response: String,
    /// 最终音频产物的 URL 路径
    pub audio_url: Option<String>,
}
