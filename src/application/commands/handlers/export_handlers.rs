//! Export Command Handlers

use std::sync::Arc;

use crate::application::commands::{
    CancelExport, CancelExportResponse, SubmitExport, SubmitExportResponse,
};
use crate::application::error::ApplicationError;
use crate::application::ports::ExportJobManagerPort;

/// SubmitExport Handler - 提交整书导出
pub struct SubmitExportHandler {
    job_manager: Arc<dyn ExportJobManagerPort>,
}

impl SubmitExportHandler {
    pub fn new(job_manager: Arc<dyn ExportJobManagerPort>) -> Self {
        Self { job_manager }
    }

    pub fn handle(&self, command: SubmitExport) -> Result<SubmitExportResponse, ApplicationError> {
        let total_pages = command.document.page_count();
        let record = self.job_manager.submit(command.document)?;

        tracing::info!(
            job_id = %record.job_id,
            total_pages = total_pages,
            "Export job submitted"
        );

        Ok(SubmitExportResponse {
            job_id: record.job_id,
            state: record.state,
            total_pages,
        })
    }
}

/// CancelExport Handler - 取消导出
pub struct CancelExportHandler {
    job_manager: Arc<dyn ExportJobManagerPort>,
}

impl CancelExportHandler {
    pub fn new(job_manager: Arc<dyn ExportJobManagerPort>) -> Self {
        Self { job_manager }
    }

    pub fn handle(&self, command: CancelExport) -> Result<CancelExportResponse, ApplicationError> {
        let state = self.job_manager.cancel(command.job_id)?;

        tracing::info!(job_id = %command.job_id, state = %state.as_str(), "Export cancel requested");

        Ok(CancelExportResponse {
            job_id: command.job_id,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{DocumentSourcePort, JobState};
    use crate::infrastructure::adapters::TextDocument;
    use crate::infrastructure::memory::ExportJobManager;
    use uuid::Uuid;

    fn document() -> Arc<dyn DocumentSourcePort> {
        Arc::new(TextDocument::new("Chapter one.\u{c}Chapter two."))
    }

    #[test]
    fn test_second_submit_conflicts() {
        let (manager, _rx) = ExportJobManager::new(4);
        let manager: Arc<dyn ExportJobManagerPort> = Arc::new(manager);
        let handler = SubmitExportHandler::new(manager);

        let first = handler.handle(SubmitExport { document: document() }).unwrap();
        assert_eq!(first.state, JobState::Pending);
        assert_eq!(first.total_pages, 2);

        let second = handler.handle(SubmitExport { document: document() });
        assert!(matches!(second, Err(ApplicationError::Conflict(_))));
    }

    #[test]
    fn test_cancel_pending_job() {
        let (manager, _rx) = ExportJobManager::new(4);
        let manager: Arc<dyn ExportJobManagerPort> = Arc::new(manager);
        let submitted = SubmitExportHandler::new(manager.clone())
            .handle(SubmitExport { document: document() })
            .unwrap();

        let cancel = CancelExportHandler::new(manager.clone());
        let response = cancel
            .handle(CancelExport {
                job_id: submitted.job_id,
            })
            .unwrap();
        assert_eq!(response.state, JobState::Cancelled);
        assert!(manager.is_cancelled(submitted.job_id));

        let missing = cancel.handle(CancelExport {
            job_id: Uuid::new_v4(),
        });
        assert!(matches!(missing, Err(ApplicationError::NotFound { .. })));
    }
}
