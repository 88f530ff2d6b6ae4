//! Document Context - 文档限界上下文
//!
//! 职责:
//! - 页面与文本段（带位置）
//! - 边距过滤
//! - 文本块实体

mod entities;
mod errors;

pub use entities::{PageContent, TextChunk, TextRun};
pub use errors::DocumentError;
