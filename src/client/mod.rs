//! Terminal Client - 会话控制器、音频播放、头像动画

pub mod api;
pub mod avatar;
pub mod controller;
pub mod player;

pub use api::{cache_busted, ChatApi, ChatReply, ClientError, HttpChatApi, FALLBACK_ERROR};
pub use avatar::{Avatar, AvatarTimings, EyeFrame, IntervalBounds, MouthFrame};
pub use controller::{ConversationController, ConversationState, KeyInput};
pub use player::{
    AudioPlayer, CommandAudioPlayer, PlaybackDriver, PlaybackSession, PlayerError,
    DEFAULT_PLAYER_COMMAND,
};
