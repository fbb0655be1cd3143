//! Chat API Client - 调用 /api/chat
//!
//! 服务端错误体为 `{"error": "..."}`；解析不到时使用通用提示

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;

use crate::infrastructure::http::dto::{ChatRequest, ChatResponse, ErrorResponse};

/// 服务端没有给出可用错误信息时展示的提示
pub const FALLBACK_ERROR: &str = "Failed to get response from server.";

/// 客户端错误
#[derive(Debug, Error)]
pub enum ClientError {
    /// 服务端返回了带 error 字段的错误响应
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 错误响应体无法解析
    #[error("Server returned HTTP {status} without a readable error")]
    MalformedError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// 展示给用户的错误文本
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server { message, .. } if !message.is_empty() => message.clone(),
            _ => FALLBACK_ERROR.to_string(),
        }
    }
}

/// 服务端回复
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    /// 已解析为绝对 URL
    pub audio_url: Option<String>,
}

/// 聊天接口抽象
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send(&self, message: &str) -> Result<ChatReply, ClientError>;
}

/// 基于 reqwest 的实现
pub struct HttpChatApi {
    client: Client,
    base_url: Url,
}

impl HttpChatApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        // 保证以 / 结尾，join 时不会丢掉最后一段路径
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn chat_url(&self) -> Result<Url, ClientError> {
        self.base_url
            .join("api/chat")
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    fn resolve(&self, url: &str) -> Result<String, ClientError> {
        self.base_url
            .join(url)
            .map(|u| u.to_string())
            .map_err(|e| ClientError::InvalidResponse(format!("Bad audio URL {}: {}", url, e)))
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn send(&self, message: &str) -> Result<ChatReply, ClientError> {
        let response = self
            .client
            .post(self.chat_url()?)
            .json(&ChatRequest {
                message: Some(message.to_string()),
            })
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => ClientError::Server {
                    status: status.as_u16(),
                    message: err.error,
                },
                Err(_) => ClientError::MalformedError {
                    status: status.as_u16(),
                },
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let audio_url = match reply.audio_url.as_deref() {
            Some(url) if !url.is_empty() => Some(self.resolve(url)?),
            _ => None,
        };

        Ok(ChatReply {
            text: reply.response,
            audio_url,
        })
    }
}

/// 追加时间戳参数，避免浏览器/播放器缓存同名音频
pub fn cache_busted(url: &str, timestamp_millis: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, separator, timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_busted() {
        assert_eq!(
            cache_busted("http://h/audio/speech.mp3", 1700000000000),
            "http://h/audio/speech.mp3?t=1700000000000"
        );
        assert_eq!(cache_busted("http://h/a.mp3?v=1", 5), "http://h/a.mp3?v=1&t=5");
    }

    #[test]
    fn test_user_message_fallback() {
        let server = ClientError::Server {
            status: 400,
            message: "Message is required".to_string(),
        };
        assert_eq!(server.user_message(), "Message is required");

        let empty = ClientError::Server {
            status: 500,
            message: String::new(),
        };
        assert_eq!(empty.user_message(), FALLBACK_ERROR);
        assert_eq!(
            ClientError::Network("refused".to_string()).user_message(),
            FALLBACK_ERROR
        );
    }

    #[tokio::test]
    async fn test_send_resolves_audio_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(mockito::Matcher::Json(serde_json::json!({"message": "hi"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"Blink.","audioUrl":"/audio/speech.mp3"}"#)
            .create_async()
            .await;

        let api = HttpChatApi::new(&server.url(), Duration::from_secs(5)).unwrap();
        let reply = api.send("hi").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply.text, "Blink.");
        assert_eq!(
            reply.audio_url,
            Some(format!("{}/audio/speech.mp3", server.url()))
        );
    }

    #[tokio::test]
    async fn test_send_surfaces_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(400)
            .with_body(r#"{"error":"Message is required"}"#)
            .create_async()
            .await;

        let api = HttpChatApi::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = api.send(" ").await.unwrap_err();
        assert_eq!(err.user_message(), "Message is required");
    }

    #[tokio::test]
    async fn test_send_malformed_error_uses_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let api = HttpChatApi::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = api.send("hi").await.unwrap_err();
        assert!(matches!(err, ClientError::MalformedError { status: 502 }));
        assert_eq!(err.user_message(), FALLBACK_ERROR);
    }
}
