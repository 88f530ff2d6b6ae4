//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::{DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 导出配置
    #[serde(default)]
    pub export: ExportConfig,

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
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// TTS 引擎类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngineKind {
    /// OpenAI 兼容的 HTTP 服务
    #[default]
    Http,
    /// 本地假引擎，不发起网络请求
    Fake,
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 引擎类型
    #[serde(default)]
    pub engine: TtsEngineKind,

    /// 默认服务地址（用户未配置 baseUrl 时使用）
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 单次请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_url() -> String {
    "http://localhost:8880".to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            engine: TtsEngineKind::default(),
            url: default_tts_url(),
            timeout_secs: default_tts_timeout(),
        }
    }
}

/// 导出配置
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// 同时进行中的合成请求上限
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    /// 等待执行的导出任务队列长度
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 下载文件名
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// 下载 Content-Type
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// 文本块最小字符数
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// 文本块最大字符数
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

fn default_max_in_flight() -> usize {
    3
}

fn default_queue_capacity() -> usize {
    16
}

fn default_file_name() -> String {
    "audiobook.mp3".to_string()
}

fn default_content_type() -> String {
    "audio/mpeg".to_string()
}

fn default_min_chars() -> usize {
    DEFAULT_MIN_CHARS
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
            queue_capacity: default_queue_capacity(),
            file_name: default_file_name(),
            content_type: default_content_type(),
            min_chars: default_min_chars(),
            max_chars: default_max_chars(),
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 配置数据库路径
    #[serde(default = "default_config_db_path")]
    pub config_db_path: PathBuf,

    /// 导出结果目录
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_config_db_path() -> PathBuf {
    PathBuf::from("data/config.sled")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("data/exports")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            config_db_path: default_config_db_path(),
            export_dir: default_export_dir(),
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
