//! Export Queries - 导出任务查询

use uuid::Uuid;

/// 查询导出任务状态
#[derive(Debug, Clone)]
pub struct GetExportStatus {
    pub job_id: Uuid,
}

/// 获取导出完成的有声书
#[derive(Debug, Clone)]
pub struct GetAudiobook {
    pub job_id: Uuid,
}

/// 有声书下载响应
#[derive(Debug, Clone)]
pub struct GetAudiobookResponse {
    pub audio_data: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}
