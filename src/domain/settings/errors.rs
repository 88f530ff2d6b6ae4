//! Settings Context - Errors

use thiserror::Error;

use super::ConfigKey;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: ConfigKey, reason: String },
}
