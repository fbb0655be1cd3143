//! OpenAI Chat Client - 调用 OpenAI 兼容的对话补全服务
//!
//! 实现 LlmEnginePort trait
//!
//! 外部 API:
//! POST {base_url}/chat/completions
//! Request: {"model": "...", "messages": [system, user], "max_tokens": 100}
//! Response: {"choices": [{"message": {"content": "..."}, "finish_reason": "stop"}], "model": "..."}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{CompletionRequest, CompletionResponse, LlmEnginePort, LlmError};
use crate::infrastructure::adapters::openai_error::upstream_error_message;

#[derive(Debug, Serialize)]
struct ChatMessageBody<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessageBody<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI 客户端配置
#[derive(Debug, Clone)]
pub struct OpenAiChatClientConfig {
    /// API 基础 URL
    pub base_url: String,
    /// API 密钥
    pub api_key: String,
    /// 模型名称
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for OpenAiChatClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

impl OpenAiChatClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }
}

/// OpenAI 兼容的对话补全客户端
pub struct OpenAiChatClient {
    client: Client,
    config: OpenAiChatClientConfig,
}

impl OpenAiChatClient {
    pub fn new(config: OpenAiChatClientConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

fn map_send_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else if e.is_connect() {
        LlmError::NetworkError(format!("Cannot connect to language model service: {}", e))
    } else {
        LlmError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl LlmEnginePort for OpenAiChatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = ChatCompletionBody {
            model: &self.config.model,
            messages: vec![
                ChatMessageBody {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessageBody {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            max_tokens: request.max_tokens,
        };

        tracing::debug!(
            url = %self.completions_url(),
            model = %self.config.model,
            message_len = request.user_message.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ServiceError {
                status: status.as_u16(),
                message: upstream_error_message(status, &error_text),
            });
        }

        let reply: ChatCompletionReply = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::InvalidResponse(format!("Failed to decode completion: {}", e))
            }
        })?;

        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        let content = choice.message.content.ok_or_else(|| {
            LlmError::InvalidResponse("Completion has no message content".to_string())
        })?;

        tracing::debug!(
            model = ?reply.model,
            finish_reason = ?choice.finish_reason,
            content_len = content.len(),
            "Chat completion received"
        );

        Ok(CompletionResponse {
            content,
            model: reply.model,
            finish_reason: choice.finish_reason,
        })
    }
}
