//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::application::ports::JobState;

/// WebSocket 事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 导出进度（0..=100）
    ExportProgress { job_id: Uuid, progress: f64 },
    /// 导出任务状态变更
    ExportStateChanged {
        job_id: Uuid,
        state: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// 配置项已更新
    ConfigChanged { key: String },
}

/// 事件发布器
pub struct EventPublisher {
    /// job_id -> broadcast sender (for job-specific events)
    job_channels: DashMap<Uuid, broadcast::Sender<WsEvent>>,
    /// 全局广播（状态变更、配置变更）
    global_channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(100);
        Self {
            job_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全局事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<WsEvent> {
        self.global_channel.subscribe()
    }

    /// 订阅任务事件（通道不存在时创建）
    pub fn subscribe_job(&self, job_id: Uuid) -> broadcast::Receiver<WsEvent> {
        self.job_channels
            .entry(job_id)
            .or_insert_with(|| broadcast::channel(100).0)
            .subscribe()
    }

    /// 任务结束后释放通道
    pub fn unregister_job(&self, job_id: Uuid) {
        self.job_channels.remove(&job_id);
    }

    /// 发布导出进度
    pub fn publish_progress(&self, job_id: Uuid, progress: f64) {
        self.publish_to_job(job_id, WsEvent::ExportProgress { job_id, progress });
    }

    /// 发布任务状态变更（任务通道 + 全局）
    pub fn publish_state(&self, job_id: Uuid, state: JobState, error: Option<&str>) {
        let event = WsEvent::ExportStateChanged {
            job_id,
            state: state.as_str().to_string(),
            error: error.map(str::to_string),
        };
        self.publish_to_job(job_id, event.clone());
        self.publish_global(event);
    }

    /// 发布配置变更（全局）
    pub fn publish_config_changed(&self, key: &str) {
        self.publish_global(WsEvent::ConfigChanged {
            key: key.to_string(),
        });
    }

    fn publish_global(&self, event: WsEvent) {
        if let Err(e) = self.global_channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish global event (no receivers)");
        }
    }

    /// 发布事件到指定任务
    fn publish_to_job(&self, job_id: Uuid, event: WsEvent) {
        if let Some(sender) = self.job_channels.get(&job_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    job_id = %job_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
