//! Export Commands - 导出任务提交与取消

use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{DocumentSourcePort, JobState};

/// 提交导出命令
#[derive(Clone)]
pub struct SubmitExport {
    pub document: Arc<dyn DocumentSourcePort>,
}

/// 提交导出响应
#[derive(Debug, Clone)]
pub struct SubmitExportResponse {
    pub job_id: Uuid,
    pub state: JobState,
    pub total_pages: usize,
}

/// 取消导出命令
#[derive(Debug, Clone)]
pub struct CancelExport {
    pub job_id: Uuid,
}

/// 取消导出响应
#[derive(Debug, Clone)]
pub struct CancelExportResponse {
    pub job_id: Uuid,
    pub state: JobState,
}
