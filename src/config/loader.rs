//! Configuration Loader
//!
//! 多源配置加载与合并
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

/// 环境变量前缀
const ENV_PREFIX: &str = "OPENREADER";

/// 加载应用配置
///
/// # 环境变量示例
/// - `OPENREADER_SERVER__PORT=8080`
/// - `OPENREADER_TTS__URL=http://kokoro:8880`
/// - `OPENREADER_TTS__ENGINE=fake`
/// - `OPENREADER_EXPORT__MAX_IN_FLIGHT=4`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置，`None` 时搜索默认文件名
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("tts.engine", "http")?
        .set_default("tts.url", "http://localhost:8880")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("export.max_in_flight", 3)?
        .set_default("export.queue_capacity", 16)?
        .set_default("export.file_name", "audiobook.mp3")?
        .set_default("export.content_type", "audio/mpeg")?
        .set_default("storage.config_db_path", "data/config.sled")?
        .set_default("storage.export_dir", "data/exports")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 层级分隔符为双下划线，例如 OPENREADER_TTS__URL
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let app_config: AppConfig = builder.build()?.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.tts.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if config.export.max_in_flight == 0 {
        return Err(ConfigError::ValidationError(
            "export.max_in_flight must be at least 1".to_string(),
        ));
    }

    if config.export.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "export.queue_capacity must be at least 1".to_string(),
        ));
    }

    if config.export.max_chars == 0 || config.export.min_chars > config.export.max_chars {
        return Err(ConfigError::ValidationError(format!(
            "Invalid chunk bounds: min_chars={} max_chars={}",
            config.export.min_chars, config.export.max_chars
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("TTS Engine: {:?}", config.tts.engine);
    tracing::info!("TTS URL: {}", config.tts.url);
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!("Max In-flight Requests: {}", config.export.max_in_flight);
    tracing::info!(
        "Chunk Size: {}..={} chars",
        config.export.min_chars,
        config.export.max_chars
    );
    tracing::info!("Config Store: {:?}", config.storage.config_db_path);
    tracing::info!("Export Directory: {:?}", config.storage.export_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
