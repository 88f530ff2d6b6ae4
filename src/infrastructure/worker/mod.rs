//! Worker Layer - Background Task Processing
//!
//! 实现 ExportWorker，逐个处理整书导出任务

mod export_worker;

pub use export_worker::{ExportWorker, ExportWorkerConfig};
