//! File Storage - 文件系统有声书存储实现
//!
//! 实现 AudiobookStoragePort trait，每个导出任务一个文件

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{AudiobookStorageError, AudiobookStoragePort};

/// 文件系统有声书存储
pub struct FileAudiobookStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileAudiobookStorage {
    /// 创建文件存储（目录在首次保存时创建）
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn audiobook_path(&self, job_id: Uuid) -> PathBuf {
        self.base_dir.join(format!("{}.mp3", job_id))
    }
}

#[async_trait]
impl AudiobookStoragePort for FileAudiobookStorage {
    async fn save(&self, job_id: Uuid, data: &[u8]) -> Result<PathBuf, AudiobookStorageError> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| AudiobookStorageError::IoError(e.to_string()))?;

        let path = self.audiobook_path(job_id);
        fs::write(&path, data)
            .await
            .map_err(|e| AudiobookStorageError::IoError(e.to_string()))?;

        tracing::debug!(
            job_id = %job_id,
            path = %path.display(),
            size = data.len(),
            "Saved audiobook"
        );

        Ok(path)
    }

    async fn read(&self, job_id: Uuid) -> Result<Vec<u8>, AudiobookStorageError> {
        match fs::read(self.audiobook_path(job_id)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AudiobookStorageError::NotFound(job_id)),
            Err(e) => Err(AudiobookStorageError::IoError(e.to_string())),
        }
    }

    async fn remove(&self, job_id: Uuid) -> Result<(), AudiobookStorageError> {
        match fs::remove_file(self.audiobook_path(job_id)).await {
            Ok(()) => {
                tracing::debug!(job_id = %job_id, "Deleted audiobook");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AudiobookStorageError::IoError(e.to_string())),
        }
    }
}
