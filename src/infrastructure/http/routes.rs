//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                      GET   健康检查
//! - /api/config/get                GET   获取配置（apiKey 掩码）
//! - /api/config/update_key         POST  更新单个配置项
//! - /api/config/update             POST  更新凭据与显示模式
//! - /api/export/submit             POST  提交整书导出（异步，通过 WS 通知进度）
//! - /api/export/status             POST  查询导出状态
//! - /api/export/cancel             POST  取消导出
//! - /api/export/download/{job_id}  GET   下载导出结果
//! - /ws/export/{job_id}            WS    导出任务 WebSocket（进度事件）
//! - /ws/events                     WS    全局 WebSocket（状态、配置事件）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/export/:job_id", get(handlers::export_websocket_handler))
        .route("/ws/events", get(handlers::global_websocket_handler))
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/config", config_routes())
        .nest("/export", export_routes())
}

/// Config 路由
fn config_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/get", get(handlers::get_config))
        .route("/update_key", post(handlers::update_config_key))
        .route("/update", post(handlers::update_config))
}

/// Export 路由
fn export_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/submit", post(handlers::submit_export))
        .route("/status", post(handlers::get_export_status))
        .route("/cancel", post(handlers::cancel_export))
        .route("/download/:job_id", get(handlers::download_audiobook))
}
