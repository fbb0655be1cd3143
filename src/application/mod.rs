//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（LlmEngine、TtsEngine、AudioTranscoder、AudioStorage）
//! - commands: 命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::{
    handlers::{ChatSettings, SendChatHandler},
    SendChatCommand, SendChatResponse,
};

pub use error::ApplicationError;

pub use ports::{
    // Audio storage
    AudioStorageError,
    AudioStoragePort,
    // Transcoder
    AudioTranscoderPort,
    TranscodeError,
    // LLM engine
    CompletionRequest,
    CompletionResponse,
    LlmEnginePort,
    LlmError,
    // TTS engine
    SpeechRequest,
    SpeechResponse,
    TtsEnginePort,
    TtsError,
};
