//! WebSocket Handlers

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use uuid::Uuid;

use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::state::AppState;

/// 导出任务 WebSocket（进度与状态）
pub async fn export_websocket_handler(
    ws: WebSocketUpgrade,
    Path(job_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_export_socket(socket, job_id, state))
}

/// 全局 WebSocket（任务状态变更、配置变更）
pub async fn global_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_global_socket(socket, state))
}

fn encode(event: &WsEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            None
        }
    }
}

fn is_final(event: &WsEvent) -> bool {
    matches!(
        event,
        WsEvent::ExportStateChanged { state, .. }
            if matches!(state.as_str(), "completed" | "failed" | "cancelled")
    )
}

async fn handle_export_socket(socket: WebSocket, job_id: Uuid, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 先订阅再读取快照，避免漏掉中间的事件
    let mut event_rx = state.event_publisher.subscribe_job(job_id);

    let Some(job) = state.job_manager.get_job(job_id) else {
        tracing::warn!(job_id = %job_id, "WebSocket connection rejected: unknown export job");
        state.event_publisher.unregister_job(job_id);
        let _ = sender.close().await;
        return;
    };

    tracing::info!(job_id = %job_id, "Export WebSocket connected");

    // 当前快照
    let snapshot = [
        WsEvent::ExportProgress {
            job_id,
            progress: job.progress,
        },
        WsEvent::ExportStateChanged {
            job_id,
            state: job.state.as_str().to_string(),
            error: job.error_message.clone(),
        },
    ];
    for event in &snapshot {
        if let Some(msg) = encode(event) {
            if sender.send(msg).await.is_err() {
                return;
            }
        }
    }
    if job.state.is_terminal() {
        let _ = sender.close().await;
        return;
    }

    // 事件转发任务，任务结束后关闭连接
    let forward_task = tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            let done = is_final(&event);
            let Some(msg) = encode(&event) else { continue };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(job_id = %job_id, error = %e, "Failed to send WebSocket message");
                break;
            }
            if done {
                let _ = sender.close().await;
                break;
            }
        }
    });

    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!(job_id = %job_id, "Export WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(job_id = %job_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!(job_id = %job_id, "Export WebSocket disconnected");
}

async fn handle_global_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut event_rx = state.event_publisher.subscribe_global();

    tracing::info!("Global WebSocket connected");

    let forward_task = tokio::spawn(async move {
        while let Ok(event) = event_rx.recv().await {
            let Some(msg) = encode(&event) else { continue };
            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send global WebSocket message");
                break;
            }
        }
    });

    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Global WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Global WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!("Global WebSocket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_events() {
        let job_id = Uuid::new_v4();
        let state = |s: &str| WsEvent::ExportStateChanged {
            job_id,
            state: s.to_string(),
            error: None,
        };
        assert!(is_final(&state("completed")));
        assert!(is_final(&state("cancelled")));
        assert!(!is_final(&state("running")));
        assert!(!is_final(&WsEvent::ExportProgress { job_id, progress: 100.0 }));
    }
}
