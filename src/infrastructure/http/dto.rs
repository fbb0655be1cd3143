//! Data Transfer Objects
//!
//! /api/chat 的请求与响应体，客户端与服务端共用

use serde::{Deserialize, Serialize};

use crate::application::SendChatResponse;

/// POST /api/chat 请求体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// 缺失与空字符串都按校验错误处理
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /api/chat 成功响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl From<SendChatResponse> for ChatResponse {
    fn from(r: SendChatResponse) -> Self {
        Self {
            response: r.response,
            audio_url: r.audio_url,
        }
    }
}

/// 错误响应体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
