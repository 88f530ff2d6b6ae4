//! Memory Layer - In-Memory State Management
//!
//! 导出任务注册表与降级用的内存配置存储

mod export_manager;
mod key_value_store;

pub use export_manager::ExportJobManager;
pub use key_value_store::InMemoryKeyValueStore;
