//! HTTP TTS Client - 调用 OpenAI 兼容的语音合成服务
//!
//! 实现 TtsEnginePort trait
//!
//! 外部 TTS API:
//! POST {base_url}/audio/speech
//! Request: {"model": "tts-1", "input": "...", "voice": "alloy", "response_format": "mp3"}
//! Response: 音频二进制

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SpeechRequest, SpeechResponse, TtsEnginePort, TtsError};
use crate::infrastructure::adapters::openai_error::upstream_error_message;

/// TTS 请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// API 密钥
    pub api_key: String,
    /// 模型
    pub model: String,
    /// 音色
    pub voice: String,
    /// 输出格式
    pub format: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            format: "mp3".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpTtsClientConfig {
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

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取合成 URL
    fn speech_url(&self) -> String {
        format!("{}/audio/speech", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechResponse, TtsError> {
        let body = TtsHttpRequest {
            model: &self.config.model,
            input: &request.text,
            voice: &self.config.voice,
            response_format: &self.config.format,
        };

        tracing::debug!(
            url = %self.speech_url(),
            text_len = request.text.len(),
            voice = %self.config.voice,
            "Sending TTS request"
        );

        let response = self
            .client
            .post(self.speech_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError {
                status: status.as_u16(),
                message: upstream_error_message(status, &error_text),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else {
                    TtsError::InvalidResponse(format!("Failed to read audio: {}", e))
                }
            })?
            .to_vec();

        tracing::info!(
            content_type = ?content_type,
            audio_size = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(SpeechResponse {
            audio_data,
            content_type,
        })
    }

    fn file_extension(&self) -> &str {
        &self.config.format
    }
}
