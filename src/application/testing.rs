//! 测试用端口实现
//!
//! 记录调用次数，按预设返回结果，不访问网络

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{
    AudioTranscoderPort, CompletionRequest, CompletionResponse, LlmEnginePort, LlmError,
    SpeechRequest, SpeechResponse, TranscodeError, TtsEnginePort, TtsError,
};

/// 固定回复的语言模型
pub struct FakeLlm {
    reply: Result<String, (u16, String)>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            reply: Err((status, message.to_string())),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmEnginePort for FakeLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        match &self.reply {
            Ok(text) => Ok(CompletionResponse {
                content: text.clone(),
                model: Some("fake".to_string()),
                finish_reason: Some("stop".to_string()),
            }),
            Err((status, message)) => Err(LlmError::ServiceError {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

/// 返回回复文本字节作为“音频”的 TTS
pub struct FakeTts {
    failure: Option<(u16, String)>,
    calls: AtomicUsize,
}

impl FakeTts {
    pub fn new() -> Self {
        Self {
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            failure: Some((status, message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TtsEnginePort for FakeTts {
    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechResponse, TtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((status, message)) = &self.failure {
            return Err(TtsError::ServiceError {
                status: *status,
                message: message.clone(),
            });
        }
        Ok(SpeechResponse {
            audio_data: format!("AUDIO:{}", request.text).into_bytes(),
            content_type: Some("audio/mpeg".to_string()),
        })
    }
}

/// 复制文件或模拟非零退出的转码器
pub struct FakeTranscoder {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeTranscoder {
    pub fn copying() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioTranscoderPort for FakeTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            // 模拟写了一半就失败
            tokio::fs::write(output, b"partial")
                .await
                .map_err(|e| TranscodeError::IoError(e.to_string()))?;
            return Err(TranscodeError::NonZeroExit {
                status: "exit status: 1".to_string(),
                stderr: "filter failed".to_string(),
            });
        }
        let mut data = tokio::fs::read(input)
            .await
            .map_err(|e| TranscodeError::IoError(e.to_string()))?;
        data.extend_from_slice(b":PROCESSED");
        tokio::fs::write(output, data)
            .await
            .map_err(|e| TranscodeError::IoError(e.to_string()))
    }
}
