//! Chat Context - 对话限界上下文
//!
//! 职责:
//! - 用户消息校验
//! - 回复文本
//! - 音频产物命名

mod errors;
mod value_objects;

pub use errors::ChatError;
pub use value_objects::{ArtifactId, AudioArtifact, ChatMessage, ReplyText};
