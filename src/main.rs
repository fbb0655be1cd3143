//! Iris - 聊天中继服务
//!
//! 接收消息 → 语言模型 → 语音合成 → 可选转码 → 返回文本与音频 URL

use std::sync::Arc;

use iris::application::{
    AudioTranscoderPort, ChatSettings, SendChatHandler, TtsEnginePort,
};
use iris::config::{load_config, print_config, AppConfig};
use iris::infrastructure::adapters::{
    FfmpegTranscoder, FfmpegTranscoderConfig, FileAudioStorage, FileAudioStorageConfig,
    HttpTtsClient, HttpTtsClientConfig, OpenAiChatClient, OpenAiChatClientConfig,
};
use iris::infrastructure::http::{AppState, HttpServer, ServerConfig, StaticMounts};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},iris={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Iris - talking avatar chat relay");
    print_config(&config);

    // 确保音频目录存在，静态服务启动时即可挂载
    tokio::fs::create_dir_all(&config.storage.audio_dir).await?;

    let llm = Arc::new(OpenAiChatClient::new(OpenAiChatClientConfig {
        base_url: config.llm.base_url.clone(),
        api_key: config.llm.api_key.clone(),
        model: config.llm.model.clone(),
        timeout_secs: config.llm.timeout_secs,
    })?);

    let tts: Option<Arc<dyn TtsEnginePort>> = if config.tts.enabled {
        Some(Arc::new(HttpTtsClient::new(HttpTtsClientConfig {
            base_url: config.tts.base_url.clone(),
            api_key: config.tts.api_key.clone(),
            model: config.tts.model.clone(),
            voice: config.tts.voice.clone(),
            format: config.tts.format.clone(),
            timeout_secs: config.tts.timeout_secs,
        })?))
    } else {
        None
    };

    // 没有语音就没有可转码的文件
    let transcoder: Option<Arc<dyn AudioTranscoderPort>> =
        if config.tts.enabled && config.transcode.enabled {
            Some(Arc::new(FfmpegTranscoder::new(FfmpegTranscoderConfig {
                binary: config.transcode.binary.clone(),
                sample_rate: config.transcode.sample_rate,
                timeout_secs: config.transcode.timeout_secs,
            })))
        } else {
            None
        };

    let storage = Arc::new(FileAudioStorage::new(FileAudioStorageConfig {
        base_dir: config.storage.audio_dir.clone(),
        url_prefix: config.storage.url_prefix.clone(),
        naming: config.storage.naming,
        max_artifacts: config.storage.max_artifacts,
    }));

    let handler = SendChatHandler::new(
        llm,
        tts,
        transcoder,
        storage,
        ChatSettings {
            system_prompt: config.llm.system_prompt.clone(),
            max_tokens: config.llm.max_tokens,
            fallback_to_text: config.tts.fallback_to_text,
        },
    );

    let static_files = &config.server.static_files;
    let mounts = StaticMounts {
        audio_dir: config.storage.audio_dir.clone(),
        audio_url_prefix: config.storage.url_prefix.clone(),
        web: static_files
            .enabled
            .then(|| (static_files.dir.clone(), static_files.path.clone())),
    };

    let server_config = ServerConfig::new(&config.server.host, config.server.port, mounts);
    let server = HttpServer::new(server_config, AppState::new(handler));

    tracing::info!("Starting HTTP server...");

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
