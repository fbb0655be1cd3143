//! Audio Playback
//!
//! 播放器通过外部命令实现（默认 ffplay），播放状态以 watch 通道对外广播。
//! 同一时间只有一段音频在播放：新的播放请求会先中断上一段。

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 默认播放命令，URL 作为最后一个参数追加
pub const DEFAULT_PLAYER_COMMAND: &str = "ffplay -nodisp -autoexit -loglevel quiet";

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player command is empty")]
    EmptyCommand,

    #[error("Failed to start player: {0}")]
    Spawn(String),

    #[error("Playback failed: {0}")]
    Playback(String),
}

/// 播放器
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// 开始播放，返回可等待结束的会话
    async fn start(&self, url: &str) -> Result<Box<dyn PlaybackSession>, PlayerError>;
}

/// 一次播放
#[async_trait]
pub trait PlaybackSession: Send {
    /// 播放自然结束时返回；会话被 drop 即中断播放
    async fn finished(&mut self) -> Result<(), PlayerError>;
}

/// 外部命令播放器
#[derive(Debug, Clone)]
pub struct CommandAudioPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandAudioPlayer {
    /// 按空白切分命令行
    pub fn from_command_line(command: &str) -> Result<Self, PlayerError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(PlayerError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    fn build_command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl AudioPlayer for CommandAudioPlayer {
    async fn start(&self, url: &str) -> Result<Box<dyn PlaybackSession>, PlayerError> {
        let child = self
            .build_command(url)
            .spawn()
            .map_err(|e| PlayerError::Spawn(format!("{}: {}", self.program, e)))?;
        tracing::debug!(player = %self.program, url = %url, "Playback started");
        Ok(Box::new(ChildSession { child }))
    }
}

struct ChildSession {
    child: Child,
}

#[async_trait]
impl PlaybackSession for ChildSession {
    async fn finished(&mut self) -> Result<(), PlayerError> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| PlayerError::Playback(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(PlayerError::Playback(format!("player exited with {}", status)))
        }
    }
}

/// 播放驱动：维护当前播放任务与 playing 标志
pub struct PlaybackDriver {
    player: Arc<dyn AudioPlayer>,
    playing: Arc<watch::Sender<bool>>,
    current: Option<(CancellationToken, JoinHandle<()>)>,
}

impl PlaybackDriver {
    pub fn new(player: Arc<dyn AudioPlayer>) -> Self {
        let (playing, _) = watch::channel(false);
        Self {
            player,
            playing: Arc::new(playing),
            current: None,
        }
    }

    /// 订阅 playing 标志
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.playing.subscribe()
    }

    pub fn is_playing(&self) -> bool {
        *self.playing.borrow()
    }

    /// 中断当前播放并开始播放 url
    pub async fn play(&mut self, url: String) {
        self.stop().await;

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_playback(
            self.player.clone(),
            url,
            self.playing.clone(),
            token.clone(),
        ));
        self.current = Some((token, handle));
    }

    /// 中断当前播放，等待任务退出
    pub async fn stop(&mut self) {
        if let Some((token, handle)) = self.current.take() {
            token.cancel();
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Playback task panicked");
            }
        }
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        if let Some((token, _)) = &self.current {
            token.cancel();
        }
    }
}

async fn run_playback(
    player: Arc<dyn AudioPlayer>,
    url: String,
    playing: Arc<watch::Sender<bool>>,
    token: CancellationToken,
) {
    let started = tokio::select! {
        _ = token.cancelled() => return,
        result = player.start(&url) => result,
    };

    let mut session = match started {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "Failed to start playback");
            playing.send_replace(false);
            return;
        }
    };

    playing.send_replace(true);

    tokio::select! {
        _ = token.cancelled() => {
            tracing::debug!(url = %url, "Playback interrupted");
        }
        result = session.finished() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, url = %url, "Playback ended with error");
            }
        }
    }

    // drop 会话即终止子进程
    drop(session);
    playing.send_replace(false);
}


#[cfg(test)]
mod tests {
    use super::testing::FakePlayer;
    use super::*;

    #[test]
    fn test_command_line_parsing() {
        let player = CommandAudioPlayer::from_command_line(DEFAULT_PLAYER_COMMAND).unwrap();
        let cmd = player.build_command("http://h/audio/speech.mp3?t=1");
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "ffplay");
        let args: Vec<_> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec![
                "-nodisp",
                "-autoexit",
                "-loglevel",
                "quiet",
                "http://h/audio/speech.mp3?t=1"
            ]
        );
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(matches!(
            CommandAudioPlayer::from_command_line("   "),
            Err(PlayerError::EmptyCommand)
        ));
    }

    #[tokio::test]
    async fn test_playing_flag_follows_playback() {
        let player = Arc::new(FakePlayer::default());
        let mut driver = PlaybackDriver::new(player.clone());
        let mut playing = driver.subscribe();
        assert!(!*playing.borrow());

        driver.play("http://h/a.mp3".to_string()).await;
        playing.wait_for(|p| *p).await.unwrap();
        assert!(driver.is_playing());

        player.finish();
        playing.wait_for(|p| !*p).await.unwrap();
    }

    #[tokio::test]
    async fn test_new_playback_interrupts_previous() {
        let player = Arc::new(FakePlayer::default());
        let mut driver = PlaybackDriver::new(player.clone());
        let mut playing = driver.subscribe();

        driver.play("http://h/first.mp3".to_string()).await;
        playing.wait_for(|p| *p).await.unwrap();

        driver.play("http://h/second.mp3".to_string()).await;
        playing.wait_for(|p| *p).await.unwrap();
        assert_eq!(
            player.started(),
            vec!["http://h/first.mp3", "http://h/second.mp3"]
        );

        driver.stop().await;
        assert!(!driver.is_playing());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_player_binary_keeps_flag_down() {
        let player = Arc::new(
            CommandAudioPlayer::from_command_line("/nonexistent/iris-player-binary").unwrap(),
        );
        let mut driver = PlaybackDriver::new(player);
        driver.play("http://h/a.mp3".to_string()).await;
        driver.stop().await;
        assert!(!driver.is_playing());
    }
}
