//! Storage Adapter - 有声书文件存储

mod file_storage;

pub use file_storage::FileAudiobookStorage;
