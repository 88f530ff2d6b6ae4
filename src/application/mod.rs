//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（KeyValueStore、TtsEngine、DocumentSource、ExportJobManager 等）
//! - services: 配置管理、文本块提取、整书导出
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;

// Re-exports
pub use commands::{
    // Config commands
    UpdateConfig,
    UpdateConfigKey,
    // Export commands
    CancelExport,
    CancelExportResponse,
    SubmitExport,
    SubmitExportResponse,
    // Handlers
    handlers::{
        CancelExportHandler, SubmitExportHandler, UpdateConfigHandler, UpdateConfigKeyHandler,
        UpdateConfigKeyResponse,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Audiobook storage
    AudiobookStorageError,
    AudiobookStoragePort,
    // Document source
    DocumentSourcePort,
    // Export jobs
    ExportJobManagerPort,
    ExportJobRecord,
    ExportSubmission,
    JobError,
    JobState,
    // Key-value store
    KeyValueStorePort,
    StoreError,
    // TTS engine
    SynthesisRequest,
    TtsEndpoint,
    TtsEnginePort,
    TtsError,
};

pub use queries::{
    // Config queries
    GetConfig,
    GetConfigResponse,
    // Export queries
    GetAudiobook,
    GetAudiobookResponse,
    GetExportStatus,
    // Handlers
    handlers::{GetAudiobookHandler, GetConfigHandler, GetExportStatusHandler},
};

pub use services::{
    AudiobookExporter, ChunkExtractor, ConfigError, ConfigManager, ConfigState, ConfigUpdate,
    ExportError, ExportSettings, ExporterConfig, ExtractionSettings,
};
