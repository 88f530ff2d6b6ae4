//! Application Services - 应用服务
//!
//! - ConfigManager: 类型化配置与持久化
//! - ChunkExtractor: 文档文本块提取
//! - AudiobookExporter: 整书合成与拼接

mod audiobook_exporter;
mod chunk_extractor;
mod config_manager;

pub use audiobook_exporter::{AudiobookExporter, ExportError, ExportSettings, ExporterConfig};
pub use chunk_extractor::{
    ChunkExtractor, ChunkStream, ExtractError, ExtractionSettings, ExtractionStats,
};
pub use config_manager::{ConfigError, ConfigManager, ConfigState, ConfigUpdate};
