//! In-Memory Key-Value Store Implementation
//!
//! 持久化存储不可用时的降级实现，仅在当前进程生命周期内有效

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{KeyValueStorePort, StoreError};

/// 内存键值存储
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: DashMap<String, String>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 当前条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStorePort for InMemoryKeyValueStore {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = InMemoryKeyValueStore::new();
        store.init().await.unwrap();

        assert_eq!(store.get("voice").await.unwrap(), None);

        store.set("voice", "af_bella").await.unwrap();
        assert_eq!(store.get("voice").await.unwrap().as_deref(), Some("af_bella"));
        assert_eq!(store.len(), 1);

        store.remove("voice").await.unwrap();
        assert!(!store.contains_key("voice"));

        // 删除不存在的 key 不报错
        store.remove("voice").await.unwrap();
    }
}
