//! Settings Context - Value Objects

use serde::{Deserialize, Serialize};

use super::SettingsError;

/// 文档显示模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    /// 单页
    #[default]
    Single,
    /// 双页
    Dual,
    /// 连续滚动
    Scroll,
}

impl ViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::Single => "single",
            ViewType::Dual => "dual",
            ViewType::Scroll => "scroll",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "single" => Some(ViewType::Single),
            "dual" => Some(ViewType::Dual),
            "scroll" => Some(ViewType::Scroll),
            _ => None,
        }
    }
}

impl std::fmt::Display for ViewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 配置项键名
///
/// 与持久化存储中的 key 一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiKey,
    BaseUrl,
    ViewType,
    VoiceSpeed,
    Voice,
    SkipBlank,
    EpubTheme,
    TextExtractionMargin,
}

impl ConfigKey {
    /// 所有已知配置项（加载顺序）
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::ApiKey,
        ConfigKey::BaseUrl,
        ConfigKey::ViewType,
        ConfigKey::VoiceSpeed,
        ConfigKey::Voice,
        ConfigKey::SkipBlank,
        ConfigKey::EpubTheme,
        ConfigKey::TextExtractionMargin,
    ];

    /// 存储中使用的 key
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "apiKey",
            ConfigKey::BaseUrl => "baseUrl",
            ConfigKey::ViewType => "viewType",
            ConfigKey::VoiceSpeed => "voiceSpeed",
            ConfigKey::Voice => "voice",
            ConfigKey::SkipBlank => "skipBlank",
            ConfigKey::EpubTheme => "epubTheme",
            ConfigKey::TextExtractionMargin => "textExtractionMargin",
        }
    }

    pub fn parse(s: &str) -> Result<Self, SettingsError> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }

    /// 敏感配置：不写默认值，空字符串表示删除
    pub fn is_sensitive(&self) -> bool {
        matches!(self, ConfigKey::ApiKey | ConfigKey::BaseUrl)
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 文本提取边距比例，取值范围 [0, 0.2]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MarginFraction(f64);

impl MarginFraction {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 0.2;

    pub fn new(value: f64) -> Result<Self, SettingsError> {
        if !value.is_finite() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(SettingsError::InvalidValue {
                key: ConfigKey::TextExtractionMargin,
                reason: format!("margin must be within [{}, {}], got {}", Self::MIN, Self::MAX, value),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for MarginFraction {
    fn default() -> Self {
        Self(0.07)
    }
}

impl TryFrom<f64> for MarginFraction {
    type Error = SettingsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MarginFraction> for f64 {
    fn from(margin: MarginFraction) -> Self {
        margin.0
    }
}

/// 语速，必须为正数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct VoiceSpeed(f64);

impl VoiceSpeed {
    pub fn new(value: f64) -> Result<Self, SettingsError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SettingsError::InvalidValue {
                key: ConfigKey::VoiceSpeed,
                reason: format!("speed must be a positive number, got {}", value),
            });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for VoiceSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f64> for VoiceSpeed {
    type Error = SettingsError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VoiceSpeed> for f64 {
    fn from(speed: VoiceSpeed) -> Self {
        speed.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_key_round_trip_names() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::parse(key.as_str()).unwrap(), key);
        }
        assert!(ConfigKey::parse("fontSize").is_err());
    }

    #[test]
    fn test_only_credentials_are_sensitive() {
        let sensitive: Vec<_> = ConfigKey::ALL.iter().filter(|k| k.is_sensitive()).collect();
        assert_eq!(sensitive, vec![&ConfigKey::ApiKey, &ConfigKey::BaseUrl]);
    }

    #[test]
    fn test_margin_bounds() {
        assert!(MarginFraction::new(0.0).is_ok());
        assert!(MarginFraction::new(0.2).is_ok());
        assert!(MarginFraction::new(0.21).is_err());
        assert!(MarginFraction::new(-0.01).is_err());
        assert!(MarginFraction::new(f64::NAN).is_err());
    }

    #[test]
    fn test_voice_speed_must_be_positive() {
        assert!(VoiceSpeed::new(1.25).is_ok());
        assert!(VoiceSpeed::new(0.0).is_err());
        assert!(VoiceSpeed::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_view_type_names() {
        assert_eq!(ViewType::from_str("dual"), Some(ViewType::Dual));
        assert_eq!(ViewType::from_str("grid"), None);
        assert_eq!(ViewType::Scroll.to_string(), "scroll");
    }
}
