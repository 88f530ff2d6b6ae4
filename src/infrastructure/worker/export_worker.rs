//! Export Worker - Background Audiobook Export Processor

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::ports::{
    AudiobookStoragePort, DocumentSourcePort, ExportJobManagerPort, ExportSubmission, JobState,
};
use crate::application::services::{AudiobookExporter, ConfigManager, ExportError, ExportSettings};
use crate::domain::SegmentConfig;
use crate::infrastructure::events::EventPublisher;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct ExportWorkerConfig {
    /// 未配置 baseUrl 时使用的 TTS 服务地址
    pub default_tts_url: String,
    /// 分句配置
    pub segment: SegmentConfig,
}

impl Default for ExportWorkerConfig {
    fn default() -> Self {
        Self {
            default_tts_url: "http://localhost:8880".to_string(),
            segment: SegmentConfig::default(),
        }
    }
}

/// 导出 Worker
///
/// 从队列消费导出任务，同一时间只执行一个
pub struct ExportWorker {
    config: ExportWorkerConfig,
    queue_receiver: mpsc::Receiver<ExportSubmission>,
    job_manager: Arc<dyn ExportJobManagerPort>,
    config_manager: Arc<ConfigManager>,
    exporter: Arc<AudiobookExporter>,
    storage: Arc<dyn AudiobookStoragePort>,
    event_publisher: Arc<EventPublisher>,
}

impl ExportWorker {
    pub fn new(
        config: ExportWorkerConfig,
        queue_receiver: mpsc::Receiver<ExportSubmission>,
        job_manager: Arc<dyn ExportJobManagerPort>,
        config_manager: Arc<ConfigManager>,
        exporter: Arc<AudiobookExporter>,
        storage: Arc<dyn AudiobookStoragePort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            job_manager,
            config_manager,
            exporter,
            storage,
            event_publisher,
        }
    }

    /// 启动 Worker，`shutdown` 触发或队列关闭时退出
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(default_tts_url = %self.config.default_tts_url, "ExportWorker started");

        loop {
            let submission = tokio::select! {
                _ = shutdown.cancelled() => break,
                next = self.queue_receiver.recv() => match next {
                    Some(submission) => submission,
                    None => break,
                },
            };

            self.process_job(submission.job_id, submission.document, &shutdown)
                .await;
        }

        tracing::info!("ExportWorker stopped");
    }

    /// 处理单个导出任务
    async fn process_job(
        &self,
        job_id: Uuid,
        document: Arc<dyn DocumentSourcePort>,
        shutdown: &CancellationToken,
    ) {
        // 新任务开始时清理之前已结束的任务及其文件
        self.cleanup_previous(job_id).await;

        // Check 1: 任务是否在排队期间被取消
        let cancel = match self.job_manager.cancellation_token(job_id) {
            Some(token) if !token.is_cancelled() => token,
            _ => {
                tracing::debug!(job_id = %job_id, "Export job cancelled before start, skipping");
                self.finish(job_id, JobState::Cancelled, None);
                return;
            }
        };

        // 设置快照在任务开始时确定
        self.config_manager.load().await;
        let values = self.config_manager.snapshot();
        let settings =
            ExportSettings::from_config(&values, &self.config.default_tts_url, self.config.segment.clone());

        if let Err(e) = self.job_manager.set_state(job_id, JobState::Running) {
            tracing::error!(job_id = %job_id, error = %e, "Failed to update export job state");
            return;
        }
        self.event_publisher.publish_state(job_id, JobState::Running, None);

        tracing::info!(
            job_id = %job_id,
            pages = document.page_count(),
            voice = %settings.voice,
            speed = settings.speed,
            base_url = %settings.endpoint.base_url,
            "Export job started"
        );

        let job_manager = self.job_manager.clone();
        let publisher = self.event_publisher.clone();
        let on_progress = move |percent: f64| {
            if let Err(e) = job_manager.set_progress(job_id, percent) {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to record export progress");
            }
            publisher.publish_progress(job_id, percent);
        };

        // 服务关闭时取消进行中的导出
        let result = tokio::select! {
            result = self.exporter.create_full_audiobook(document, &settings, on_progress, &cancel) => result,
            _ = shutdown.cancelled() => {
                if let Err(e) = self.job_manager.cancel(job_id) {
                    tracing::warn!(job_id = %job_id, error = %e, "Failed to cancel export job on shutdown");
                }
                Err(ExportError::Cancelled)
            }
        };

        match result {
            Ok(buffer) => match self.storage.save(job_id, &buffer).await {
                Ok(path) => self.complete(job_id, path, buffer.len()).await,
                Err(e) => {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to store audiobook");
                    self.fail(job_id, format!("Storage error: {}", e));
                }
            },
            Err(ExportError::Cancelled) => {
                tracing::info!(job_id = %job_id, "Export job cancelled");
                self.finish(job_id, JobState::Cancelled, None);
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Export job failed");
                self.fail(job_id, e.to_string());
            }
        }
    }

    /// 记录完成；保存期间任务已被取消时删除刚写入的文件
    async fn complete(&self, job_id: Uuid, path: PathBuf, bytes: usize) {
        if let Err(e) = self.job_manager.set_completed(job_id, path) {
            tracing::error!(job_id = %job_id, error = %e, "Failed to complete export job");
        }

        let state = self.job_manager.get_job(job_id).map(|j| j.state);
        if state != Some(JobState::Completed) {
            tracing::info!(job_id = %job_id, "Export job cancelled while storing, discarding audiobook");
            if let Err(e) = self.storage.remove(job_id).await {
                tracing::warn!(job_id = %job_id, error = %e, "Failed to remove discarded audiobook");
            }
            self.finish(job_id, JobState::Cancelled, None);
            return;
        }

        tracing::info!(job_id = %job_id, bytes = bytes, "Export job completed");
        self.finish(job_id, JobState::Completed, None);
    }

    async fn cleanup_previous(&self, keep: Uuid) {
        for job in self.job_manager.cleanup_finished(keep) {
            // 取消的任务也可能留下文件，统一删除
            match self.storage.remove(job.job_id).await {
                Ok(()) => tracing::debug!(job_id = %job.job_id, "Previous export removed"),
                Err(e) => {
                    tracing::warn!(job_id = %job.job_id, error = %e, "Failed to remove previous export")
                }
            }
        }
    }

    fn fail(&self, job_id: Uuid, error: String) {
        if let Err(e) = self.job_manager.set_failed(job_id, error.clone()) {
            tracing::error!(job_id = %job_id, error = %e, "Failed to update export job state");
        }
        self.finish(job_id, JobState::Failed, Some(&error));
    }

    /// 写入终态并通知订阅者
    fn finish(&self, job_id: Uuid, state: JobState, error: Option<&str>) {
        if let Err(e) = self.job_manager.set_state(job_id, state) {
            // 终态不可变，已被取消的任务会拒绝后续状态
            tracing::debug!(job_id = %job_id, error = %e, "Export job state unchanged");
        }
        // 以注册表中的最终状态为准（取消优先于完成）
        let final_state = self
            .job_manager
            .get_job(job_id)
            .map(|j| j.state)
            .unwrap_or(state);
        self.event_publisher.publish_state(job_id, final_state, error);
        self.event_publisher.unregister_job(job_id);
    }
}
