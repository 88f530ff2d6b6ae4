//! Ping Handler
//!
//! 健康检查，附带配置存储与导出任务概况

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub config_ready: bool,
    pub config_persistent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_export: Option<Uuid>,
}

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        config_ready: state.config_manager.is_ready(),
        config_persistent: state.config_manager.is_persistent(),
        active_export: state.job_manager.active_job().map(|j| j.job_id),
    })
}
