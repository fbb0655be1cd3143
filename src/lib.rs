//! Iris - 会说话的头像聊天中继
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Chat Context: 消息、回复、音频产物
//!
//! 应用层 (application/):
//! - Ports: LlmEngine, TtsEngine, AudioTranscoder, AudioStorage
//! - Commands: SendChat 处理流程
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: /api/chat + 音频静态文件
//! - Adapters: OpenAI 兼容客户端、FFmpeg 转码器、文件存储
//!
//! 客户端 (client/):
//! - 会话控制器、音频播放、头像动画

pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
