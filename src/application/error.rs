//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;
use uuid::Uuid;

use crate::application::ports::{AudiobookStorageError, JobError};
use crate::application::services::ConfigError;
use crate::domain::settings::SettingsError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: Uuid,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 与当前状态冲突（例如已有导出在进行）
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 服务暂不可用
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource_type, id }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<SettingsError> for ApplicationError {
    fn from(err: SettingsError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Settings(e) => e.into(),
            e @ ConfigError::WriteFailed { .. } => Self::StorageError(e.to_string()),
        }
    }
}

impl From<JobError> for ApplicationError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(id) => Self::not_found("Export job", id),
            JobError::AlreadyRunning(_) => Self::Conflict(err.to_string()),
            JobError::QueueUnavailable(_) => Self::Unavailable(err.to_string()),
        }
    }
}

impl From<AudiobookStorageError> for ApplicationError {
    fn from(err: AudiobookStorageError) -> Self {
        match err {
            AudiobookStorageError::NotFound(id) => Self::not_found("Audiobook", id),
            AudiobookStorageError::IoError(_) => Self::StorageError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::ConfigKey;

    #[test]
    fn test_job_errors_map_to_categories() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ApplicationError::from(JobError::NotFound(id)),
            ApplicationError::NotFound { resource_type: "Export job", .. }
        ));
        assert!(matches!(
            ApplicationError::from(JobError::AlreadyRunning(id)),
            ApplicationError::Conflict(_)
        ));
    }

    #[test]
    fn test_config_errors_map_to_categories() {
        let unknown = ConfigError::Settings(SettingsError::UnknownKey("theme".to_string()));
        assert!(matches!(
            ApplicationError::from(unknown),
            ApplicationError::ValidationError(_)
        ));

        let write = ConfigError::WriteFailed {
            key: ConfigKey::Voice,
            source: crate::application::ports::StoreError::Unavailable("locked".to_string()),
        };
        assert!(matches!(
            ApplicationError::from(write),
            ApplicationError::StorageError(_)
        ));
    }
}
