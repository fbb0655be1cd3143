//! OpenAI 兼容接口的错误体解析
//!
//! 错误体格式: {"error": {"message": "...", "type": "...", "code": ...}}

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// 错误消息最大长度
const MAX_ERROR_LEN: usize = 500;

/// 从上游错误响应中提取可读消息
///
/// 优先使用 `error.message`，否则退回 `HTTP {status}: {body}`
pub fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if !envelope.error.message.is_empty() {
            return envelope.error.message;
        }
    }

    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {}", status);
    }

    let truncated: String = body.chars().take(MAX_ERROR_LEN).collect();
    format!("HTTP {}: {}", status, truncated)
}
