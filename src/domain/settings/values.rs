//! Settings Context - 配置值
//!
//! 存储中所有值均为字符串，这里负责类型化解析与序列化

use serde::Serialize;

use super::{ConfigKey, MarginFraction, SettingsError, ViewType, VoiceSpeed};

/// 默认音色
pub const DEFAULT_VOICE: &str = "af_sarah";

/// 应用配置值（内存缓存视图）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValues {
    pub api_key: String,
    pub base_url: String,
    pub view_type: ViewType,
    pub voice_speed: VoiceSpeed,
    pub voice: String,
    pub skip_blank: bool,
    pub epub_theme: bool,
    pub text_extraction_margin: MarginFraction,
}

impl Default for ConfigValues {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            view_type: ViewType::default(),
            voice_speed: VoiceSpeed::default(),
            voice: DEFAULT_VOICE.to_string(),
            skip_blank: true,
            epub_theme: false,
            text_extraction_margin: MarginFraction::default(),
        }
    }
}

impl ConfigValues {
    /// 读取某一项的类型化值
    pub fn get(&self, key: ConfigKey) -> ConfigEntry {
        match key {
            ConfigKey::ApiKey => ConfigEntry::ApiKey(self.api_key.clone()),
            ConfigKey::BaseUrl => ConfigEntry::BaseUrl(self.base_url.clone()),
            ConfigKey::ViewType => ConfigEntry::ViewType(self.view_type),
            ConfigKey::VoiceSpeed => ConfigEntry::VoiceSpeed(self.voice_speed),
            ConfigKey::Voice => ConfigEntry::Voice(self.voice.clone()),
            ConfigKey::SkipBlank => ConfigEntry::SkipBlank(self.skip_blank),
            ConfigKey::EpubTheme => ConfigEntry::EpubTheme(self.epub_theme),
            ConfigKey::TextExtractionMargin => {
                ConfigEntry::TextExtractionMargin(self.text_extraction_margin)
            }
        }
    }

    /// 写入某一项
    pub fn apply(&mut self, entry: ConfigEntry) {
        match entry {
            ConfigEntry::ApiKey(v) => self.api_key = v,
            ConfigEntry::BaseUrl(v) => self.base_url = v,
            ConfigEntry::ViewType(v) => self.view_type = v,
            ConfigEntry::VoiceSpeed(v) => self.voice_speed = v,
            ConfigEntry::Voice(v) => self.voice = v,
            ConfigEntry::SkipBlank(v) => self.skip_blank = v,
            ConfigEntry::EpubTheme(v) => self.epub_theme = v,
            ConfigEntry::TextExtractionMargin(v) => self.text_extraction_margin = v,
        }
    }

    /// 从存储中的原始字符串构造配置
    ///
    /// 缺失或无法解析的值一律回退到默认值，永不报错
    pub fn from_stored<F>(mut lookup: F) -> Self
    where
        F: FnMut(ConfigKey) -> Option<String>,
    {
        let mut values = Self::default();
        for key in ConfigKey::ALL {
            if let Some(raw) = lookup(key) {
                if let Some(entry) = ConfigEntry::from_stored(key, &raw) {
                    values.apply(entry);
                }
            }
        }
        values
    }
}

/// 单个类型化配置项
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEntry {
    ApiKey(String),
    BaseUrl(String),
    ViewType(ViewType),
    VoiceSpeed(VoiceSpeed),
    Voice(String),
    SkipBlank(bool),
    EpubTheme(bool),
    TextExtractionMargin(MarginFraction),
}

impl ConfigEntry {
    pub fn key(&self) -> ConfigKey {
        match self {
            ConfigEntry::ApiKey(_) => ConfigKey::ApiKey,
            ConfigEntry::BaseUrl(_) => ConfigKey::BaseUrl,
            ConfigEntry::ViewType(_) => ConfigKey::ViewType,
            ConfigEntry::VoiceSpeed(_) => ConfigKey::VoiceSpeed,
            ConfigEntry::Voice(_) => ConfigKey::Voice,
            ConfigEntry::SkipBlank(_) => ConfigKey::SkipBlank,
            ConfigEntry::EpubTheme(_) => ConfigKey::EpubTheme,
            ConfigEntry::TextExtractionMargin(_) => ConfigKey::TextExtractionMargin,
        }
    }

    /// 存储用字符串形式
    pub fn to_stored(&self) -> String {
        match self {
            ConfigEntry::ApiKey(v) | ConfigEntry::BaseUrl(v) | ConfigEntry::Voice(v) => v.clone(),
            ConfigEntry::ViewType(v) => v.as_str().to_string(),
            ConfigEntry::VoiceSpeed(v) => v.value().to_string(),
            ConfigEntry::SkipBlank(v) | ConfigEntry::EpubTheme(v) => v.to_string(),
            ConfigEntry::TextExtractionMargin(v) => v.value().to_string(),
        }
    }

    /// 是否为删除操作（敏感项的空字符串）
    pub fn is_removal(&self) -> bool {
        match self {
            ConfigEntry::ApiKey(v) | ConfigEntry::BaseUrl(v) => v.is_empty(),
            _ => false,
        }
    }

    /// 解析存储中的原始字符串
    ///
    /// 布尔值只接受精确的 "true"；无法解析时返回 None（调用方使用默认值）
    pub fn from_stored(key: ConfigKey, raw: &str) -> Option<Self> {
        match key {
            ConfigKey::ApiKey if !raw.is_empty() => Some(ConfigEntry::ApiKey(raw.to_string())),
            ConfigKey::BaseUrl if !raw.is_empty() => Some(ConfigEntry::BaseUrl(raw.to_string())),
            ConfigKey::ApiKey | ConfigKey::BaseUrl => None,
            ConfigKey::ViewType => ViewType::from_str(raw).map(ConfigEntry::ViewType),
            ConfigKey::VoiceSpeed => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|v| VoiceSpeed::new(v).ok())
                .map(ConfigEntry::VoiceSpeed),
            ConfigKey::Voice if !raw.is_empty() => Some(ConfigEntry::Voice(raw.to_string())),
            ConfigKey::Voice => None,
            ConfigKey::SkipBlank => Some(ConfigEntry::SkipBlank(raw == "true")),
            ConfigKey::EpubTheme => Some(ConfigEntry::EpubTheme(raw == "true")),
            ConfigKey::TextExtractionMargin => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|v| MarginFraction::new(v).ok())
                .map(ConfigEntry::TextExtractionMargin),
        }
    }

    /// 从 JSON 值构造（HTTP 层使用）
    pub fn from_json(key: ConfigKey, value: &serde_json::Value) -> Result<Self, SettingsError> {
        let invalid = |reason: &str| SettingsError::InvalidValue {
            key,
            reason: reason.to_string(),
        };

        match key {
            ConfigKey::ApiKey | ConfigKey::BaseUrl | ConfigKey::Voice => {
                let s = value.as_str().ok_or_else(|| invalid("expected a string"))?;
                Ok(match key {
                    ConfigKey::ApiKey => ConfigEntry::ApiKey(s.to_string()),
                    ConfigKey::BaseUrl => ConfigEntry::BaseUrl(s.to_string()),
                    _ => {
                        if s.trim().is_empty() {
                            return Err(invalid("voice cannot be empty"));
                        }
                        ConfigEntry::Voice(s.to_string())
                    }
                })
            }
            ConfigKey::ViewType => {
                let s = value.as_str().ok_or_else(|| invalid("expected a string"))?;
                ViewType::from_str(s)
                    .map(ConfigEntry::ViewType)
                    .ok_or_else(|| invalid("expected one of single, dual, scroll"))
            }
            ConfigKey::VoiceSpeed => {
                let v = value.as_f64().ok_or_else(|| invalid("expected a number"))?;
                Ok(ConfigEntry::VoiceSpeed(VoiceSpeed::new(v)?))
            }
            ConfigKey::TextExtractionMargin => {
                let v = value.as_f64().ok_or_else(|| invalid("expected a number"))?;
                Ok(ConfigEntry::TextExtractionMargin(MarginFraction::new(v)?))
            }
            ConfigKey::SkipBlank | ConfigKey::EpubTheme => {
                let v = value.as_bool().ok_or_else(|| invalid("expected a boolean"))?;
                Ok(if key == ConfigKey::SkipBlank {
                    ConfigEntry::SkipBlank(v)
                } else {
                    ConfigEntry::EpubTheme(v)
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let values = ConfigValues::default();
        assert_eq!(values.api_key, "");
        assert_eq!(values.view_type, ViewType::Single);
        assert_eq!(values.voice_speed.value(), 1.0);
        assert_eq!(values.voice, "af_sarah");
        assert!(values.skip_blank);
        assert!(!values.epub_theme);
        assert_eq!(values.text_extraction_margin.value(), 0.07);
    }

    #[test]
    fn test_from_stored_parses_types() {
        let stored: HashMap<&str, &str> = [
            ("apiKey", "sk-123"),
            ("viewType", "scroll"),
            ("voiceSpeed", "1.25"),
            ("skipBlank", "false"),
            ("epubTheme", "true"),
            ("textExtractionMargin", "0.1"),
        ]
        .into_iter()
        .collect();

        let values = ConfigValues::from_stored(|k| stored.get(k.as_str()).map(|v| v.to_string()));
        assert_eq!(values.api_key, "sk-123");
        assert_eq!(values.base_url, "");
        assert_eq!(values.view_type, ViewType::Scroll);
        assert_eq!(values.voice_speed.value(), 1.25);
        assert!(!values.skip_blank);
        assert!(values.epub_theme);
        assert_eq!(values.text_extraction_margin.value(), 0.1);
    }

    #[test]
    fn test_invalid_stored_values_fall_back_to_default() {
        let stored: HashMap<&str, &str> = [
            ("viewType", "grid"),
            ("voiceSpeed", "fast"),
            ("textExtractionMargin", "0.5"),
            ("epubTheme", "TRUE"),
        ]
        .into_iter()
        .collect();

        let values = ConfigValues::from_stored(|k| stored.get(k.as_str()).map(|v| v.to_string()));
        assert_eq!(values.view_type, ViewType::Single);
        assert_eq!(values.voice_speed.value(), 1.0);
        assert_eq!(values.text_extraction_margin.value(), 0.07);
        // 只有精确的 "true" 才为真
        assert!(!values.epub_theme);
    }

    #[test]
    fn test_to_stored_formats() {
        assert_eq!(
            ConfigEntry::VoiceSpeed(VoiceSpeed::new(1.25).unwrap()).to_stored(),
            "1.25"
        );
        assert_eq!(ConfigEntry::VoiceSpeed(VoiceSpeed::default()).to_stored(), "1");
        assert_eq!(ConfigEntry::SkipBlank(true).to_stored(), "true");
        assert_eq!(ConfigEntry::ViewType(ViewType::Dual).to_stored(), "dual");
    }

    #[test]
    fn test_removal_only_for_empty_credentials() {
        assert!(ConfigEntry::ApiKey(String::new()).is_removal());
        assert!(ConfigEntry::BaseUrl(String::new()).is_removal());
        assert!(!ConfigEntry::ApiKey("k".into()).is_removal());
    }

    #[test]
    fn test_from_json() {
        let entry = ConfigEntry::from_json(ConfigKey::VoiceSpeed, &json!(1.5)).unwrap();
        assert_eq!(entry, ConfigEntry::VoiceSpeed(VoiceSpeed::new(1.5).unwrap()));

        assert!(ConfigEntry::from_json(ConfigKey::SkipBlank, &json!("yes")).is_err());
        assert!(ConfigEntry::from_json(ConfigKey::TextExtractionMargin, &json!(0.3)).is_err());
        assert!(ConfigEntry::from_json(ConfigKey::Voice, &json!("")).is_err());
    }
}
