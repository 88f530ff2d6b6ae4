//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audiobook_storage;
mod document_source;
mod job_manager;
mod key_value_store;
mod tts_engine;

pub use audiobook_storage::{AudiobookStorageError, AudiobookStoragePort};
pub use document_source::DocumentSourcePort;
pub use job_manager::{
    ExportJobManagerPort, ExportJobRecord, ExportSubmission, JobError, JobState,
};
pub use key_value_store::{KeyValueStorePort, StoreError};
pub use tts_engine::{SynthesisRequest, TtsEndpoint, TtsEnginePort, TtsError};
