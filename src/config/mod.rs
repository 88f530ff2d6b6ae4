//! Configuration Module
//!
//! 服务启动配置，支持多层级配置来源：
//! - 环境变量（最高优先级）
//! - 配置文件（TOML 格式）
//! - 默认值（最低优先级）
//!
//! 用户可修改的运行时设置（apiKey、voice 等）不在这里，见 `ConfigManager`

mod loader;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{
    AppConfig, ExportConfig, LogConfig, ServerConfig, StorageConfig, TtsConfig, TtsEngineKind,
};
