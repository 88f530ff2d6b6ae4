//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CancelExportHandler, SubmitExportHandler, UpdateConfigHandler, UpdateConfigKeyHandler,
    // Query handlers
    GetAudiobookHandler, GetConfigHandler, GetExportStatusHandler,
    // Ports & services
    AudiobookStoragePort, ConfigManager, ExportJobManagerPort,
};
use crate::infrastructure::events::EventPublisher;

/// 下载响应设置
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub content_type: String,
    pub file_name: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            content_type: "audio/mpeg".to_string(),
            file_name: "audiobook.mp3".to_string(),
        }
    }
}

/// 应用状态
pub struct AppState {
    // ========== Shared ==========
    pub config_manager: Arc<ConfigManager>,
    pub job_manager: Arc<dyn ExportJobManagerPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub update_config_key_handler: UpdateConfigKeyHandler,
    pub update_config_handler: UpdateConfigHandler,
    pub submit_export_handler: SubmitExportHandler,
    pub cancel_export_handler: CancelExportHandler,

    // ========== Query Handlers ==========
    pub get_config_handler: GetConfigHandler,
    pub get_export_status_handler: GetExportStatusHandler,
    pub get_audiobook_handler: GetAudiobookHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        config_manager: Arc<ConfigManager>,
        job_manager: Arc<dyn ExportJobManagerPort>,
        storage: Arc<dyn AudiobookStoragePort>,
        event_publisher: Arc<EventPublisher>,
        download: DownloadSettings,
    ) -> Self {
        Self {
            config_manager: config_manager.clone(),
            job_manager: job_manager.clone(),
            event_publisher,

            // Command handlers
            update_config_key_handler: UpdateConfigKeyHandler::new(config_manager.clone()),
            update_config_handler: UpdateConfigHandler::new(config_manager.clone()),
            submit_export_handler: SubmitExportHandler::new(job_manager.clone()),
            cancel_export_handler: CancelExportHandler::new(job_manager.clone()),

            // Query handlers
            get_config_handler: GetConfigHandler::new(config_manager),
            get_export_status_handler: GetExportStatusHandler::new(job_manager.clone()),
            get_audiobook_handler: GetAudiobookHandler::new(
                job_manager,
                storage,
                download.content_type,
                download.file_name,
            ),
        }
    }
}
