//! Key-Value Store Port - 配置持久化存储抽象
//!
//! 字符串键值存储，具体实现在 infrastructure 层（Sled / 内存）

use async_trait::async_trait;
use thiserror::Error;

/// Key-Value Store 错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 底层存储无法打开，调用方应降级为仅内存模式
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store not initialized")]
    NotInitialized,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid stored value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Key-Value Store Port
///
/// 所有操作在单次调用内是原子的；同一个 key 的先写后读需要调用方 await 保证顺序
#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    /// 初始化存储（幂等），必须在 get/set 之前完成
    async fn init(&self) -> Result<(), StoreError>;

    /// 读取值，不存在返回 None
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// 写入值
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// 删除值（不存在时不报错）
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
