//! Infrastructure Layer - 基础设施层
//!
//! - http: axum 路由、handler、错误映射
//! - adapters: LLM / TTS 客户端、转码器、文件存储

pub mod adapters;
pub mod http;
