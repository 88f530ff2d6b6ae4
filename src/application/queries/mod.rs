//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod config_queries;
mod export_queries;

pub mod handlers;

pub use config_queries::*;
pub use export_queries::*;
