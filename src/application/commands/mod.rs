//! 应用层 - 命令
//!
//! 每个命令对应一次完整的请求处理流程

mod chat_commands;

pub mod handlers;

pub use chat_commands::*;
