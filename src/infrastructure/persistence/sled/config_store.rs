//! Sled-based Key-Value Config Store Implementation

use async_trait::async_trait;
use sled::{Db, Tree};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::application::ports::{KeyValueStorePort, StoreError};

/// 配置项所在的 tree 名称
const CONFIG_TREE: &str = "config";

/// Sled 配置存储配置
#[derive(Debug, Clone)]
pub struct SledStoreConfig {
    /// 数据库路径
    pub db_path: String,
}

impl Default for SledStoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/config.sled".to_string(),
        }
    }
}

/// Sled 键值配置存储
///
/// `init` 时才真正打开数据库，打开失败返回 `StoreError::Unavailable`
pub struct SledKeyValueStore {
    config: SledStoreConfig,
    handle: OnceCell<(Db, Tree)>,
}

impl SledKeyValueStore {
    /// 创建存储实例（不打开数据库）
    pub fn new(config: SledStoreConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
        }
    }

    /// 以指定路径创建
    pub fn at<P: AsRef<Path>>(path: P) -> Self {
        Self::new(SledStoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
        })
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn tree(&self) -> Result<&Tree, StoreError> {
        self.handle
            .get()
            .map(|(_, tree)| tree)
            .ok_or(StoreError::NotInitialized)
    }

    fn decode(key: &str, value: sled::IVec) -> Result<String, StoreError> {
        String::from_utf8(value.to_vec()).map_err(|e| StoreError::InvalidValue {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// 刷新数据库
    pub async fn flush(&self) -> Result<(), StoreError> {
        if let Some((db, _)) = self.handle.get() {
            db.flush_async()
                .await
                .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorePort for SledKeyValueStore {
    async fn init(&self) -> Result<(), StoreError> {
        self.handle
            .get_or_try_init(|| async {
                let db = sled::open(&self.config.db_path)
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                let tree = db
                    .open_tree(CONFIG_TREE)
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;

                tracing::info!(
                    db_path = %self.config.db_path,
                    entries = tree.len(),
                    "SledKeyValueStore initialized"
                );
                Ok::<_, StoreError>((db, tree))
            })
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.tree()?.get(key) {
            Ok(Some(data)) => Self::decode(key, data).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::DatabaseError(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.tree()?
            .insert(key, value.as_bytes())
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        self.flush().await?;

        tracing::debug!(key = %key, "Config value stored");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.tree()?
            .remove(key)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        self.flush().await?;

        tracing::debug!(key = %key, "Config value removed");
        Ok(())
    }
}
