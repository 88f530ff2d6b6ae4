//! OpenReader 服务入口

use std::sync::Arc;

use openreader::application::ports::{TtsEndpoint, TtsEnginePort};
use openreader::application::services::{AudiobookExporter, ConfigManager, ExporterConfig};
use openreader::config::{load_config, print_config, AppConfig, TtsEngineKind};
use openreader::domain::SegmentConfig;
use openreader::infrastructure::adapters::{
    FakeTtsClient, FileAudiobookStorage, HttpTtsClient, HttpTtsClientConfig,
};
use openreader::infrastructure::http::{self, AppState, DownloadSettings};
use openreader::infrastructure::{
    EventPublisher, ExportJobManager, ExportWorker, ExportWorkerConfig, InMemoryKeyValueStore,
    SledKeyValueStore,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},openreader={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn create_tts_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn TtsEnginePort>> {
    let engine: Arc<dyn TtsEnginePort> = match config.tts.engine {
        TtsEngineKind::Http => {
            let client_config = HttpTtsClientConfig::default().with_timeout(config.tts.timeout_secs);
            Arc::new(HttpTtsClient::new(client_config)?)
        }
        TtsEngineKind::Fake => {
            tracing::warn!("Using fake TTS engine, exported audio is placeholder data");
            Arc::new(FakeTtsClient::new())
        }
    };
    Ok(engine)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    tracing::info!("OpenReader - audiobook export service");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.export_dir).await?;
    if let Some(parent) = config.storage.config_db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 配置存储打不开时 ConfigManager 会降级为内存存储
    let config_manager = ConfigManager::new(
        SledKeyValueStore::at(&config.storage.config_db_path).arc(),
        InMemoryKeyValueStore::new().arc(),
    )
    .arc();
    config_manager.load().await;

    let tts_engine = create_tts_engine(&config)?;
    let default_endpoint = TtsEndpoint::new(&config.tts.url, config_manager.snapshot().api_key);
    if !tts_engine.health_check(&default_endpoint).await {
        tracing::warn!(url = %config.tts.url, "TTS service is not reachable, exports will fail until it is");
    }

    let exporter = AudiobookExporter::new(
        tts_engine,
        ExporterConfig {
            max_in_flight: config.export.max_in_flight,
        },
    )
    .arc();

    let storage = Arc::new(FileAudiobookStorage::new(&config.storage.export_dir));
    let event_publisher = EventPublisher::new().arc();
    let (job_manager, queue_rx) = ExportJobManager::new(config.export.queue_capacity);
    let job_manager = job_manager.arc();

    let shutdown = CancellationToken::new();

    let worker = ExportWorker::new(
        ExportWorkerConfig {
            default_tts_url: config.tts.url.clone(),
            segment: SegmentConfig {
                min_chars: config.export.min_chars,
                max_chars: config.export.max_chars,
            },
        },
        queue_rx,
        job_manager.clone(),
        config_manager.clone(),
        exporter,
        storage.clone(),
        event_publisher.clone(),
    );
    let worker_handle = tokio::spawn(worker.run(shutdown.clone()));

    let state = AppState::new(
        config_manager,
        job_manager,
        storage,
        event_publisher,
        DownloadSettings {
            content_type: config.export.content_type.clone(),
            file_name: config.export.file_name.clone(),
        },
    );
    let signal_token = shutdown.clone();
    http::serve(&config.server.addr(), state, async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        tracing::info!("Received shutdown signal");
        signal_token.cancel();
    })
    .await?;

    // 服务器已停止，通知 Worker 退出（正在进行的导出随之取消）
    shutdown.cancel();
    if let Err(e) = worker_handle.await {
        tracing::warn!(error = %e, "Export worker terminated abnormally");
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}
