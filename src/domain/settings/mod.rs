//! Settings Context - 配置限界上下文
//!
//! 职责:
//! - 配置项键名与类型
//! - 默认值
//! - 字符串存储格式的解析与序列化

mod errors;
mod value_objects;
mod values;

pub use errors::SettingsError;
pub use value_objects::{ConfigKey, MarginFraction, ViewType, VoiceSpeed};
pub use values::{ConfigEntry, ConfigValues, DEFAULT_VOICE};
