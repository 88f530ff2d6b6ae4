//! Export Job Manager Port - 导出任务管理
//!
//! 定义导出任务生命周期管理的抽象接口，具体实现在 infrastructure/memory 层

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::DocumentSourcePort;

/// Job Manager 错误
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Export job not found: {0}")]
    NotFound(Uuid),

    #[error("Another export is already in progress: {0}")]
    AlreadyRunning(Uuid),

    #[error("Export queue unavailable: {0}")]
    QueueUnavailable(String),
}

/// 导出任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// 等待执行
    Pending,
    /// 正在导出
    Running,
    /// 导出完成，可下载
    Completed,
    /// 导出失败
    Failed,
    /// 已取消
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(JobState::Pending),
            "running" => Some(JobState::Running),
            "completed" => Some(JobState::Completed),
            "failed" => Some(JobState::Failed),
            "cancelled" => Some(JobState::Cancelled),
            _ => None,
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Cancelled)
    }
}

/// 导出任务记录
#[derive(Debug, Clone)]
pub struct ExportJobRecord {
    pub job_id: Uuid,
    pub state: JobState,
    /// 完成百分比 0..=100
    pub progress: f64,
    pub error_message: Option<String>,
    pub output_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExportJobRecord {
    pub fn new() -> Self {
        Self {
            job_id: Uuid::new_v4(),
            state: JobState::Pending,
            progress: 0.0,
            error_message: None,
            output_path: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

impl Default for ExportJobRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// 队列中的导出请求
#[derive(Clone)]
pub struct ExportSubmission {
    pub job_id: Uuid,
    pub document: Arc<dyn DocumentSourcePort>,
}

impl std::fmt::Debug for ExportSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportSubmission")
            .field("job_id", &self.job_id)
            .field("pages", &self.document.page_count())
            .finish()
    }
}

/// Export Job Manager Port
///
/// 同一时间只允许一个未结束的导出任务
pub trait ExportJobManagerPort: Send + Sync {
    /// 提交导出任务到队列
    fn submit(&self, document: Arc<dyn DocumentSourcePort>) -> Result<ExportJobRecord, JobError>;

    /// 取消任务，返回取消后的状态（终态任务保持不变）
    fn cancel(&self, job_id: Uuid) -> Result<JobState, JobError>;

    /// 获取任务的取消令牌
    fn cancellation_token(&self, job_id: Uuid) -> Option<CancellationToken>;

    /// 检查任务是否已取消
    fn is_cancelled(&self, job_id: Uuid) -> bool;

    /// 获取任务
    fn get_job(&self, job_id: Uuid) -> Option<ExportJobRecord>;

    /// 当前未结束的任务
    fn active_job(&self) -> Option<ExportJobRecord>;

    /// 设置任务状态
    fn set_state(&self, job_id: Uuid, state: JobState) -> Result<(), JobError>;

    /// 更新进度（只增不减）
    fn set_progress(&self, job_id: Uuid, progress: f64) -> Result<(), JobError>;

    /// 设置任务失败并记录错误
    fn set_failed(&self, job_id: Uuid, error: String) -> Result<(), JobError>;

    /// 设置任务完成并记录输出文件
    fn set_completed(&self, job_id: Uuid, output_path: PathBuf) -> Result<(), JobError>;

    /// 移除除 `keep` 之外所有已结束的任务，返回被移除的记录
    fn cleanup_finished(&self, keep: Uuid) -> Vec<ExportJobRecord>;
}
