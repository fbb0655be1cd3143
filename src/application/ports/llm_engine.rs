//! LLM Engine Port - 语言模型抽象
//!
//! 定义对话补全的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 语言模型错误
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Language model request timed out")]
    Timeout,

    /// 上游返回了非 2xx 状态码
    #[error("{message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// 上游 HTTP 状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::ServiceError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 补全请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// 系统提示词
    pub system_prompt: String,
    /// 用户消息
    pub user_message: String,
    /// 最大生成 token 数
    pub max_tokens: u32,
}

/// 补全响应
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// 第一个候选的原始内容（未 trim）
    pub content: String,
    /// 实际使用的模型
    pub model: Option<String>,
    /// 结束原因
    pub finish_reason: Option<String>,
}

/// LLM Engine Port
#[async_trait]
pub trait LlmEnginePort: Send + Sync {
    /// 执行一次单轮对话补全
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
