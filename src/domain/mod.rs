//! Domain Layer - 领域层
//!
//! 包含一个限界上下文:
//! - Chat Context: 消息、回复与音频产物

pub mod chat;
