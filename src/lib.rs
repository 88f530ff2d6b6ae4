//! OpenReader - 文档朗读与有声书导出服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Settings Context: 持久化的用户设置
//! - Document Context: 页面文本、边距过滤与分句
//! - Audiobook Context: 音频片段、拼接与导出进度
//!
//! 应用层 (application/):
//! - Ports: KeyValueStore, DocumentSource, TtsEngine, ExportJobManager, AudiobookStorage
//! - Services: ConfigManager, ChunkExtractor, AudiobookExporter
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: 导出任务注册表、内存配置存储
//! - Worker: ExportWorker 后台导出
//! - Persistence: Sled 配置存储
//! - Adapters: TTS 客户端、文档来源、导出文件存储
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
