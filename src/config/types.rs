//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 默认系统提示词（眼科医生角色，回复不超过 150 字符）
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an eye doctor who provides information about eye health. \
Please provide concise and clear responses that are no longer than 150 characters.";

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 语言模型配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 外部转码器配置
    #[serde(default)]
    pub transcode: TranscodeConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 静态文件服务配置
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

/// 静态文件服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    /// 是否启用静态文件服务
    #[serde(default = "default_static_enabled")]
    pub enabled: bool,

    /// 静态文件目录
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,

    /// URL 路径前缀（如 "/" 表示根路径托管）
    #[serde(default = "default_static_path")]
    pub path: String,
}

fn default_static_enabled() -> bool {
    false
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("web")
}

fn default_static_path() -> String {
    "/".to_string()
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: default_static_enabled(),
            dir: default_static_dir(),
            path: default_static_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_files: StaticFilesConfig::default(),
        }
    }
}

/// 语言模型配置（OpenAI 兼容接口）
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API 基础 URL
    #[serde(default = "default_openai_url")]
    pub base_url: String,

    /// API 密钥，未配置时回退到 OPENAI_API_KEY
    #[serde(default)]
    pub api_key: String,

    /// 模型名称
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// 最大生成 token 数
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// 系统提示词
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    100
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_llm_timeout() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_url(),
            api_key: String::new(),
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 是否启用语音合成
    #[serde(default = "default_tts_enabled")]
    pub enabled: bool,

    /// TTS 服务基础 URL
    #[serde(default = "default_openai_url")]
    pub base_url: String,

    /// API 密钥，为空时沿用 llm.api_key
    #[serde(default)]
    pub api_key: String,

    /// 模型
    #[serde(default = "default_tts_model")]
    pub model: String,

    /// 音色
    #[serde(default = "default_tts_voice")]
    pub voice: String,

    /// 输出格式（同时决定音频文件扩展名）
    #[serde(default = "default_tts_format")]
    pub format: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 合成或转码失败时是否仅返回文本
    #[serde(default)]
    pub fallback_to_text: bool,
}

fn default_tts_enabled() -> bool {
    true
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_tts_voice() -> String {
    "alloy".to_string()
}

fn default_tts_format() -> String {
    "mp3".to_string()
}

fn default_tts_timeout() -> u64 {
    60
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: default_tts_enabled(),
            base_url: default_openai_url(),
            api_key: String::new(),
            model: default_tts_model(),
            voice: default_tts_voice(),
            format: default_tts_format(),
            timeout_secs: default_tts_timeout(),
            fallback_to_text: false,
        }
    }
}

/// 外部转码器配置
#[derive(Debug, Clone, Deserialize)]
pub struct TranscodeConfig {
    /// 是否启用转码
    #[serde(default)]
    pub enabled: bool,

    /// 转码器可执行文件
    #[serde(default = "default_transcode_binary")]
    pub binary: PathBuf,

    /// asetrate 滤镜采样率（Hz），改变音高和语速
    #[serde(default = "default_transcode_rate")]
    pub sample_rate: u32,

    /// 进程超时时间（秒）
    #[serde(default = "default_transcode_timeout")]
    pub timeout_secs: u64,
}

fn default_transcode_binary() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_transcode_rate() -> u32 {
    30000
}

fn default_transcode_timeout() -> u64 {
    30
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            binary: default_transcode_binary(),
            sample_rate: default_transcode_rate(),
            timeout_secs: default_transcode_timeout(),
        }
    }
}

/// 音频产物命名方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    /// 每个请求一个唯一文件名
    #[default]
    PerRequest,
    /// 固定文件名，每次请求覆盖
    Fixed,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 音频存储目录
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,

    /// 音频静态访问 URL 前缀
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,

    /// 产物命名方式
    #[serde(default)]
    pub naming: NamingMode,

    /// per_request 模式下最多保留的音频文件数
    #[serde(default = "default_max_artifacts")]
    pub max_artifacts: usize,
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio")
}

fn default_url_prefix() -> String {
    "/audio".to_string()
}

fn default_max_artifacts() -> usize {
    32
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            url_prefix: default_url_prefix(),
            naming: NamingMode::default(),
            max_artifacts: default_max_artifacts(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
