//! HTTP Server
//!
//! 在路由外挂上中间件并监听端口

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 提交的版面 JSON 可能包含整本书
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// 带全部中间件的应用
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(3600));

    create_routes()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(error_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// 监听 `addr` 直到 `shutdown` 完成
pub async fn serve<F>(addr: &str, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app(Arc::new(state)))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ConfigManager;
    use crate::infrastructure::adapters::FileAudiobookStorage;
    use crate::infrastructure::events::EventPublisher;
    use crate::infrastructure::http::state::DownloadSettings;
    use crate::infrastructure::memory::{ExportJobManager, InMemoryKeyValueStore};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_cors_exposes_content_disposition() {
        let dir = tempfile::tempdir().unwrap();
        let (job_manager, _queue) = ExportJobManager::new(1);
        let config_manager = ConfigManager::new(
            InMemoryKeyValueStore::new().arc(),
            InMemoryKeyValueStore::new().arc(),
        )
        .arc();
        let state = AppState::new(
            config_manager,
            job_manager.arc(),
            Arc::new(FileAudiobookStorage::new(dir.path())),
            EventPublisher::new().arc(),
            DownloadSettings::default(),
        );

        let response = app(Arc::new(state))
            .oneshot(
                Request::builder()
                    .uri("/api/ping")
                    .header(header::ORIGIN, "http://reader.local")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let exposed = response.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(exposed.contains("content-disposition"));
    }
}
