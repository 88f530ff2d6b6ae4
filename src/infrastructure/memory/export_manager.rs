//! In-Memory Export Job Manager Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::ports::{
    DocumentSourcePort, ExportJobManagerPort, ExportJobRecord, ExportSubmission, JobError,
    JobState,
};

/// 内存导出任务管理器
///
/// 终态任务不再被修改；取消会立即把任务标记为 Cancelled，
/// 之后 worker 写回的结果都会被忽略
pub struct ExportJobManager {
    /// job_id -> ExportJobRecord
    jobs: DashMap<Uuid, ExportJobRecord>,
    /// job_id -> 取消令牌
    tokens: DashMap<Uuid, CancellationToken>,
    /// 最近一次提交的任务
    active: Mutex<Option<Uuid>>,
    /// 任务队列发送端
    queue_sender: mpsc::Sender<ExportSubmission>,
}

impl ExportJobManager {
    /// 创建管理器与对应的队列接收端
    pub fn new(queue_capacity: usize) -> (Self, mpsc::Receiver<ExportSubmission>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        (Self::with_sender(tx), rx)
    }

    pub fn with_sender(queue_sender: mpsc::Sender<ExportSubmission>) -> Self {
        Self {
            jobs: DashMap::new(),
            tokens: DashMap::new(),
            active: Mutex::new(None),
            queue_sender,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 修改非终态任务；终态任务保持不变
    fn update<F>(&self, job_id: Uuid, f: F) -> Result<(), JobError>
    where
        F: FnOnce(&mut ExportJobRecord),
    {
        let mut job = self.jobs.get_mut(&job_id).ok_or(JobError::NotFound(job_id))?;
        if job.state.is_terminal() {
            tracing::debug!(
                job_id = %job_id,
                state = job.state.as_str(),
                "Ignoring update for finished export job"
            );
            return Ok(());
        }
        f(&mut job);
        Ok(())
    }
}

impl ExportJobManagerPort for ExportJobManager {
    fn submit(&self, document: Arc<dyn DocumentSourcePort>) -> Result<ExportJobRecord, JobError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(active_id) = *active {
            let running = self
                .jobs
                .get(&active_id)
                .map(|j| !j.state.is_terminal())
                .unwrap_or(false);
            if running {
                return Err(JobError::AlreadyRunning(active_id));
            }
        }

        let record = ExportJobRecord::new();
        let job_id = record.job_id;
        self.jobs.insert(job_id, record.clone());
        self.tokens.insert(job_id, CancellationToken::new());

        if let Err(e) = self.queue_sender.try_send(ExportSubmission { job_id, document }) {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to enqueue export job");
            self.jobs.remove(&job_id);
            self.tokens.remove(&job_id);
            return Err(JobError::QueueUnavailable(e.to_string()));
        }

        *active = Some(job_id);
        tracing::debug!(job_id = %job_id, "Export job queued");
        Ok(record)
    }

    fn cancel(&self, job_id: Uuid) -> Result<JobState, JobError> {
        let mut job = self.jobs.get_mut(&job_id).ok_or(JobError::NotFound(job_id))?;
        if job.state.is_terminal() {
            return Ok(job.state);
        }

        if let Some(token) = self.tokens.get(&job_id) {
            token.cancel();
        }
        let old_state = job.state;
        job.state = JobState::Cancelled;
        job.completed_at = Some(Utc::now());

        tracing::debug!(
            job_id = %job_id,
            old_state = ?old_state,
            "Export job cancelled"
        );
        Ok(JobState::Cancelled)
    }

    fn cancellation_token(&self, job_id: Uuid) -> Option<CancellationToken> {
        self.tokens.get(&job_id).map(|t| t.clone())
    }

    fn is_cancelled(&self, job_id: Uuid) -> bool {
        self.tokens
            .get(&job_id)
            .map(|t| t.is_cancelled())
            .unwrap_or(true) // 不存在的任务视为已取消
    }

    fn get_job(&self, job_id: Uuid) -> Option<ExportJobRecord> {
        self.jobs.get(&job_id).map(|j| j.clone())
    }

    fn active_job(&self) -> Option<ExportJobRecord> {
        let active = *self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active
            .and_then(|id| self.get_job(id))
            .filter(|j| !j.state.is_terminal())
    }

    fn set_state(&self, job_id: Uuid, state: JobState) -> Result<(), JobError> {
        self.update(job_id, |job| {
            let old_state = job.state;
            job.state = state;
            if state.is_terminal() {
                job.completed_at = Some(Utc::now());
            }
            tracing::debug!(
                job_id = %job_id,
                old_state = ?old_state,
                new_state = ?state,
                "Export job state changed"
            );
        })
    }

    fn set_progress(&self, job_id: Uuid, progress: f64) -> Result<(), JobError> {
        self.update(job_id, |job| {
            job.progress = job.progress.max(progress.clamp(0.0, 100.0));
        })
    }

    fn set_failed(&self, job_id: Uuid, error: String) -> Result<(), JobError> {
        self.update(job_id, |job| {
            job.state = JobState::Failed;
            job.error_message = Some(error);
            job.completed_at = Some(Utc::now());
        })
    }

    fn set_completed(&self, job_id: Uuid, output_path: PathBuf) -> Result<(), JobError> {
        self.update(job_id, |job| {
            job.state = JobState::Completed;
            job.progress = 100.0;
            job.output_path = Some(output_path);
            job.completed_at = Some(Utc::now());
        })
    }

    fn cleanup_finished(&self, keep: Uuid) -> Vec<ExportJobRecord> {
        let finished: Vec<Uuid> = self
            .jobs
            .iter()
            .filter(|entry| *entry.key() != keep && entry.state.is_terminal())
            .map(|entry| *entry.key())
            .collect();

        let removed: Vec<ExportJobRecord> = finished
            .into_iter()
            .filter_map(|job_id| {
                self.tokens.remove(&job_id);
                self.jobs.remove(&job_id).map(|(_, job)| job)
            })
            .collect();

        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "Finished export jobs cleaned up");
        }
        removed
    }
}
