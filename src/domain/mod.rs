//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Settings Context: 持久化配置项
//! - Document Context: 页面文本与边距过滤
//! - Audiobook Context: 音频片段与导出进度

pub mod audiobook;
pub mod document;
pub mod settings;

// 共享的文本分割器
mod text_segmenter;

pub use text_segmenter::{segment_text, SegmentConfig, DEFAULT_MAX_CHARS, DEFAULT_MIN_CHARS};
