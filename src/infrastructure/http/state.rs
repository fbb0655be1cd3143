//! Application State
//!
//! 所有 handler 共享的应用状态

use crate::application::SendChatHandler;

/// 应用状态
pub struct AppState {
    pub send_chat_handler: SendChatHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(send_chat_handler: SendChatHandler) -> Self {
        Self { send_chat_handler }
    }
}
