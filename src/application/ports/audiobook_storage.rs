//! Audiobook Storage Port - 导出结果存储
//!
//! 保存拼接完成的有声书文件，供下载使用

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// 存储错误
#[derive(Debug, Error)]
pub enum AudiobookStorageError {
    #[error("Audiobook not found: {0}")]
    NotFound(Uuid),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Audiobook Storage Port
#[async_trait]
pub trait AudiobookStoragePort: Send + Sync {
    /// 保存有声书，返回文件路径
    async fn save(&self, job_id: Uuid, data: &[u8]) -> Result<PathBuf, AudiobookStorageError>;

    /// 读取有声书
    async fn read(&self, job_id: Uuid) -> Result<Vec<u8>, AudiobookStorageError>;

    /// 删除有声书（不存在时不报错）
    async fn remove(&self, job_id: Uuid) -> Result<(), AudiobookStorageError>;
}
