//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_storage;
mod audio_transcoder;
mod llm_engine;
mod tts_engine;

pub use audio_storage::{AudioStorageError, AudioStoragePort};
pub use audio_transcoder::{AudioTranscoderPort, TranscodeError};
pub use llm_engine::{CompletionRequest, CompletionResponse, LlmEnginePort, LlmError};
pub use tts_engine::{SpeechRequest, SpeechResponse, TtsEnginePort, TtsError};
