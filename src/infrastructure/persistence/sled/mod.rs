//! Sled Persistence - 嵌入式键值存储

mod config_store;

pub use config_store::{SledKeyValueStore, SledStoreConfig};
