//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod document;
pub mod storage;
pub mod tts;

pub use document::*;
pub use storage::*;
pub use tts::*;
