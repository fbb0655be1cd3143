//! Conversation Controller
//!
//! 输入框 + 发送 + 状态展示的逻辑部分，与具体界面无关：
//! Idle → Loading → Success / Failed，每次发送离开 Loading 恰好一次

use std::sync::Arc;

use tokio::sync::watch;

use super::api::{cache_busted, ChatApi};
use super::player::PlaybackDriver;

/// 会话状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    Loading,
    Success {
        text: String,
        /// 已附加缓存参数的音频地址
        audio_url: Option<String>,
    },
    Failed(String),
}

/// 键盘输入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    /// shift 为 true 时插入换行而不是发送
    Enter { shift: bool },
}

pub struct ConversationController {
    api: Arc<dyn ChatApi>,
    playback: Option<PlaybackDriver>,
    input: String,
    state: watch::Sender<ConversationState>,
}

impl ConversationController {
    pub fn new(api: Arc<dyn ChatApi>, playback: Option<PlaybackDriver>) -> Self {
        let (state, _) = watch::channel(ConversationState::Idle);
        Self {
            api,
            playback,
            input: String::new(),
            state,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn append_input(&mut self, text: &str) {
        self.input.push_str(text);
    }

    pub fn state(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    /// 音频播放标志；未启用播放时为 None
    pub fn playing(&self) -> Option<watch::Receiver<bool>> {
        self.playback.as_ref().map(PlaybackDriver::subscribe)
    }

    /// 处理按键，返回是否触发了发送
    pub async fn on_key(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Char(c) => {
                self.input.push(c);
                false
            }
            KeyInput::Backspace => {
                self.input.pop();
                false
            }
            KeyInput::Enter { shift: true } => {
                self.input.push('\n');
                false
            }
            KeyInput::Enter { shift: false } => self.submit().await,
        }
    }

    /// 发送当前输入
    ///
    /// 空白输入不发请求、不改状态，返回 false
    pub async fn submit(&mut self) -> bool {
        if self.input.trim().is_empty() {
            return false;
        }

        // 发送原文，服务端只用 trim 做校验
        let message = std::mem::take(&mut self.input);
        self.state.send_replace(ConversationState::Loading);

        let next = match self.api.send(&message).await {
            Ok(reply) => {
                let audio_url = reply
                    .audio_url
                    .map(|url| cache_busted(&url, chrono::Utc::now().timestamp_millis()));

                if let (Some(url), Some(playback)) = (&audio_url, self.playback.as_mut()) {
                    playback.play(url.clone()).await;
                }

                ConversationState::Success {
                    text: reply.text,
                    audio_url,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                ConversationState::Failed(e.user_message())
            }
        };

        self.state.send_replace(next);
        true
    }

    /// 停止播放
    pub async fn stop_playback(&mut self) {
        if let Some(playback) = self.playback.as_mut() {
            playback.stop().await;
        }
    }
}
