//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `IRIS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// 另外兼容两个无前缀变量：`OPENAI_API_KEY`（LLM 密钥）与 `PORT`（监听端口）。
///
/// # 环境变量示例
/// - `IRIS_SERVER__PORT=8080`
/// - `IRIS_LLM__MODEL=gpt-4o-mini`
/// - `IRIS_TTS__ENABLED=false`
/// - `IRIS_TRANSCODE__ENABLED=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000)?
        .set_default("llm.model", "gpt-4o-mini")?
        .set_default("llm.max_tokens", 100)?
        .set_default("llm.timeout_secs", 30)?
        .set_default("tts.enabled", true)?
        .set_default("tts.timeout_secs", 60)?
        .set_default("transcode.enabled", false)?
        .set_default("transcode.timeout_secs", 30)?
        .set_default("storage.audio_dir", "audio")?
        .set_default("storage.url_prefix", "/audio")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: IRIS_LLM__BASE_URL=http://localhost:8080/v1
    builder = builder.add_source(
        Environment::with_prefix("IRIS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    apply_plain_env(&mut app_config, |key| std::env::var(key).ok())?;
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 应用无前缀环境变量，并补全 TTS 密钥
fn apply_plain_env<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if config.llm.api_key.is_empty() {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            config.llm.api_key = key;
        }
    }

    if lookup("IRIS_SERVER__PORT").is_none() {
        if let Some(port) = lookup("PORT") {
            config.server.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("Invalid PORT value: {}", port))
            })?;
        }
    }

    if config.tts.api_key.is_empty() {
        config.tts.api_key = config.llm.api_key.clone();
    }

    Ok(())
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.llm.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "LLM base URL cannot be empty".to_string(),
        ));
    }

    if config.llm.max_tokens == 0 {
        return Err(ConfigError::ValidationError(
            "LLM max_tokens cannot be 0".to_string(),
        ));
    }

    if config.tts.enabled && config.tts.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS base URL cannot be empty".to_string(),
        ));
    }

    if config.tts.enabled && config.tts.format.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS format cannot be empty".to_string(),
        ));
    }

    if config.transcode.enabled {
        if config.transcode.binary.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Transcoder binary cannot be empty when transcoding is enabled".to_string(),
            ));
        }
        if config.transcode.sample_rate == 0 {
            return Err(ConfigError::ValidationError(
                "Transcoder sample rate cannot be 0".to_string(),
            ));
        }
    }

    // 路由挂载前会去掉末尾的 /，按挂载后的形式校验
    let audio_prefix = config.storage.url_prefix.trim_end_matches('/');
    if !audio_prefix.starts_with('/') || audio_prefix == "/api" {
        return Err(ConfigError::ValidationError(format!(
            "Audio URL prefix must start with '/', name a path and not be /api (got {:?})",
            config.storage.url_prefix
        )));
    }

    if config.storage.max_artifacts == 0 {
        return Err(ConfigError::ValidationError(
            "storage.max_artifacts cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("LLM: {} ({})", config.llm.model, config.llm.base_url);
    tracing::info!("LLM Timeout: {}s", config.llm.timeout_secs);
    if config.llm.api_key.is_empty() {
        tracing::warn!("LLM API key is not set (OPENAI_API_KEY / IRIS_LLM__API_KEY)");
    }
    tracing::info!("TTS Enabled: {}", config.tts.enabled);
    if config.tts.enabled {
        tracing::info!(
            "TTS: {} / {} ({})",
            config.tts.model,
            config.tts.voice,
            config.tts.base_url
        );
        tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
        tracing::info!("TTS Text Fallback: {}", config.tts.fallback_to_text);
    }
    tracing::info!("Transcode Enabled: {}", config.transcode.enabled);
    if config.transcode.enabled {
        tracing::info!(
            "Transcoder: {:?} asetrate={}",
            config.transcode.binary,
            config.transcode.sample_rate
        );
    }
    tracing::info!("Audio Directory: {:?}", config.storage.audio_dir);
    tracing::info!("Audio URL Prefix: {}", config.storage.url_prefix);
    tracing::info!("Artifact Naming: {:?}", config.storage.naming);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
