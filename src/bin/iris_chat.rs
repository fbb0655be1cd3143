//! iris-chat - 终端聊天客户端
//!
//! 每行输入发送一次；行尾的 `\` 表示换行继续输入（相当于 Shift+Enter）

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use iris::client::{
    Avatar, AvatarTimings, CommandAudioPlayer, ConversationController, ConversationState,
    HttpChatApi, KeyInput, PlaybackDriver, DEFAULT_PLAYER_COMMAND,
};

/// Iris - talk to the eye doctor from a terminal
#[derive(Parser)]
#[command(name = "iris-chat", version, about)]
struct Cli {
    /// Relay server base URL
    #[arg(short, long, env = "IRIS_SERVER_URL", default_value = "http://localhost:5000")]
    server: String,

    /// Player command; the audio URL is appended as the last argument
    #[arg(long, env = "IRIS_PLAYER", default_value = DEFAULT_PLAYER_COMMAND)]
    player: String,

    /// Do not play speech audio
    #[arg(long)]
    no_audio: bool,

    /// Request timeout in seconds; covers the server's LLM, TTS and ffmpeg budgets
    #[arg(long, default_value = "150")]
    timeout: u64,

    /// Increase verbosity (-v shows avatar frames)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,iris={},iris_chat={}", level, level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(state: &ConversationState) {
    match state {
        ConversationState::Idle => {}
        ConversationState::Loading => println!("..."),
        ConversationState::Success { text, audio_url } => {
            println!("{}", text);
            if let Some(url) = audio_url {
                tracing::debug!(audio_url = %url, "Reply audio");
            }
        }
        ConversationState::Failed(message) => println!("[error] {}", message),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let api = Arc::new(HttpChatApi::new(
        &cli.server,
        Duration::from_secs(cli.timeout),
    )?);

    let playback = if cli.no_audio {
        None
    } else {
        let player = CommandAudioPlayer::from_command_line(&cli.player)?;
        Some(PlaybackDriver::new(Arc::new(player)))
    };

    let mut controller = ConversationController::new(api, playback);

    // 没有播放时口型始终闭合
    let (_idle_tx, idle_rx) = tokio::sync::watch::channel(false);
    let playing = controller.playing().unwrap_or(idle_rx);
    let avatar = Avatar::spawn(AvatarTimings::default(), playing);

    let mut eyes = avatar.eyes();
    let mut mouth = avatar.mouth();
    let frames = tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = eyes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    tracing::debug!(eyes = ?*eyes.borrow_and_update(), "Avatar frame");
                }
                changed = mouth.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let frame = *mouth.borrow_and_update();
                    tracing::debug!(mouth = ?frame, index = frame.index(), "Avatar frame");
                }
            }
        }
    });

    let mut states = controller.subscribe();
    let renderer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            render(&state);
        }
    });

    println!("Connected to {} - type a message, end a line with \\ to continue it, Ctrl-D to quit", cli.server);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match line.strip_suffix('\\') {
            Some(partial) => {
                controller.append_input(partial);
                controller.on_key(KeyInput::Enter { shift: true }).await;
            }
            None => {
                controller.append_input(&line);
                controller.on_key(KeyInput::Enter { shift: false }).await;
            }
        }
    }

    controller.stop_playback().await;
    avatar.shutdown().await;
    drop(controller);

    if let Err(e) = renderer.await {
        tracing::warn!(error = %e, "Renderer task failed");
    }
    if let Err(e) = frames.await {
        tracing::warn!(error = %e, "Frame logger task failed");
    }

    Ok(())
}
