//! Audiobook Context - 有声书限界上下文
//!
//! 音频片段、导出进度计数与按序拼接

mod entities;

pub use entities::{AudioFragment, ExportJob, FragmentAssembler};
