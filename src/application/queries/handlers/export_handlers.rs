//! Export Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudiobookStoragePort, ExportJobManagerPort, ExportJobRecord, JobState,
};
use crate::application::queries::{GetAudiobook, GetAudiobookResponse, GetExportStatus};

/// GetExportStatus Handler - 查询任务状态
pub struct GetExportStatusHandler {
    job_manager: Arc<dyn ExportJobManagerPort>,
}

impl GetExportStatusHandler {
    pub fn new(job_manager: Arc<dyn ExportJobManagerPort>) -> Self {
        Self { job_manager }
    }

    pub fn handle(&self, query: GetExportStatus) -> Result<ExportJobRecord, ApplicationError> {
        self.job_manager
            .get_job(query.job_id)
            .ok_or_else(|| ApplicationError::not_found("Export job", query.job_id))
    }
}

/// GetAudiobook Handler - 读取导出结果
pub struct GetAudiobookHandler {
    job_manager: Arc<dyn ExportJobManagerPort>,
    storage: Arc<dyn AudiobookStoragePort>,
    content_type: String,
    file_name: String,
}

impl GetAudiobookHandler {
    pub fn new(
        job_manager: Arc<dyn ExportJobManagerPort>,
        storage: Arc<dyn AudiobookStoragePort>,
        content_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            job_manager,
            storage,
            content_type: content_type.into(),
            file_name: file_name.into(),
        }
    }

    pub async fn handle(&self, query: GetAudiobook) -> Result<GetAudiobookResponse, ApplicationError> {
        let job = self
            .job_manager
            .get_job(query.job_id)
            .ok_or_else(|| ApplicationError::not_found("Export job", query.job_id))?;

        if job.state != JobState::Completed {
            return Err(ApplicationError::invalid_state(format!(
                "Export job {} is {}",
                query.job_id,
                job.state.as_str()
            )));
        }

        let audio_data = self.storage.read(query.job_id).await?;

        Ok(GetAudiobookResponse {
            audio_data,
            content_type: self.content_type.clone(),
            file_name: self.file_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::DocumentSourcePort;
    use crate::infrastructure::adapters::{FileAudiobookStorage, TextDocument};
    use crate::infrastructure::memory::ExportJobManager;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_download_requires_completed_job() {
        let dir = tempdir().unwrap();
        let storage = Arc::new(FileAudiobookStorage::new(dir.path()));
        let (manager, _rx) = ExportJobManager::new(4);
        let manager: Arc<dyn ExportJobManagerPort> = Arc::new(manager);

        let document: Arc<dyn DocumentSourcePort> = Arc::new(TextDocument::new("Hello."));
        let job = manager.submit(document).unwrap();

        let handler = GetAudiobookHandler::new(
            manager.clone(),
            storage.clone(),
            "audio/mpeg",
            "audiobook.mp3",
        );

        let pending = handler.handle(GetAudiobook { job_id: job.job_id }).await;
        assert!(matches!(pending, Err(ApplicationError::InvalidState(_))));

        let path = storage.save(job.job_id, b"ID3audio").await.unwrap();
        manager.set_completed(job.job_id, path).unwrap();

        let response = handler.handle(GetAudiobook { job_id: job.job_id }).await.unwrap();
        assert_eq!(response.audio_data, b"ID3audio");
        assert_eq!(response.file_name, "audiobook.mp3");
    }

    #[test]
    fn test_status_of_unknown_job() {
        let (manager, _rx) = ExportJobManager::new(4);
        let handler = GetExportStatusHandler::new(Arc::new(manager));
        let result = handler.handle(GetExportStatus {
            job_id: Uuid::new_v4(),
        });
        assert!(matches!(result, Err(ApplicationError::NotFound { .. })));
    }
}
