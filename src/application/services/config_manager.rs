//! Config Manager - 类型化配置管理
//!
//! 在 KeyValueStore 之上提供内存缓存的类型化配置视图
//!
//! 生命周期: Uninitialized -> Loading -> Ready
//! - Ready 之前读取到的都是默认值
//! - 加载失败只记录日志，使用默认值，不向上传播
//! - 存储无法打开时降级为内存存储

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tokio::sync::watch;

use crate::application::ports::{KeyValueStorePort, StoreError};
use crate::domain::settings::{ConfigEntry, ConfigKey, ConfigValues, SettingsError, ViewType};

/// 配置管理错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 写入存储失败，内存状态保持不变
    #[error("Failed to persist config {key}: {source}")]
    WriteFailed {
        key: ConfigKey,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// 加载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigState {
    Uninitialized,
    Loading,
    Ready,
}

/// 批量更新（凭据 + 显示模式）
///
/// 凭据传入空字符串表示删除
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub view_type: Option<ViewType>,
}

impl ConfigUpdate {
    fn into_entries(self) -> Vec<ConfigEntry> {
        let mut entries = Vec::new();
        if let Some(api_key) = self.api_key {
            entries.push(ConfigEntry::ApiKey(api_key));
        }
        if let Some(base_url) = self.base_url {
            entries.push(ConfigEntry::BaseUrl(base_url));
        }
        if let Some(view_type) = self.view_type {
            entries.push(ConfigEntry::ViewType(view_type));
        }
        entries
    }
}

/// 配置管理器
///
/// 进程内唯一实例，以 `Arc<ConfigManager>` 共享
pub struct ConfigManager {
    store: RwLock<Arc<dyn KeyValueStorePort>>,
    fallback: Arc<dyn KeyValueStorePort>,
    values: RwLock<ConfigValues>,
    state: watch::Sender<ConfigState>,
    persistent: AtomicBool,
}

impl ConfigManager {
    /// 创建配置管理器
    ///
    /// `fallback` 在主存储不可用时接管本次会话的读写
    pub fn new(store: Arc<dyn KeyValueStorePort>, fallback: Arc<dyn KeyValueStorePort>) -> Self {
        let (state, _) = watch::channel(ConfigState::Uninitialized);
        Self {
            store: RwLock::new(store),
            fallback,
            values: RwLock::new(ConfigValues::default()),
            state,
            persistent: AtomicBool::new(true),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 当前状态
    pub fn state(&self) -> ConfigState {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ConfigState::Ready
    }

    /// 配置是否会持久化（false 表示已降级为内存存储）
    pub fn is_persistent(&self) -> bool {
        self.persistent.load(Ordering::Acquire)
    }

    /// 当前配置快照
    pub fn snapshot(&self) -> ConfigValues {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 读取单个配置项
    pub fn get(&self, key: ConfigKey) -> ConfigEntry {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
    }

    /// 等待加载完成
    pub async fn wait_ready(&self) {
        let mut rx = self.state.subscribe();
        // Sender 由 self 持有，不会出现通道关闭
        let _ = rx.wait_for(|s| *s == ConfigState::Ready).await;
    }

    /// 从存储加载配置（幂等，并发调用者等待首次加载完成）
    pub async fn load(&self) {
        let mut should_load = false;
        self.state.send_if_modified(|state| {
            if *state == ConfigState::Uninitialized {
                *state = ConfigState::Loading;
                should_load = true;
                true
            } else {
                false
            }
        });

        if !should_load {
            self.wait_ready().await;
            return;
        }

        let values = self.read_all().await;
        *self.values.write().unwrap_or_else(PoisonError::into_inner) = values;
        self.state.send_replace(ConfigState::Ready);

        tracing::info!(persistent = self.is_persistent(), "Config loaded");
    }

    /// 更新单个配置项：先写存储，成功后再提交到内存
    ///
    /// 敏感项传入空字符串时从存储中删除
    pub async fn update_config_key(&self, entry: ConfigEntry) -> Result<(), ConfigError> {
        self.load().await;

        let key = entry.key();
        let store = self.current_store();
        let result = if entry.is_removal() {
            store.remove(key.as_str()).await
        } else {
            store.set(key.as_str(), &entry.to_stored()).await
        };

        if let Err(source) = result {
            tracing::error!(key = %key, error = %source, "Failed to update config key");
            return Err(ConfigError::WriteFailed { key, source });
        }

        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(entry);

        tracing::debug!(key = %key, "Config key updated");
        Ok(())
    }

    /// 按键名与 JSON 值更新（HTTP 层使用）
    pub async fn update_by_name(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<ConfigEntry, ConfigError> {
        let key = ConfigKey::parse(key)?;
        let entry = ConfigEntry::from_json(key, value)?;
        self.update_config_key(entry.clone()).await?;
        Ok(entry)
    }

    /// 批量更新；按 api_key, base_url, view_type 顺序逐项写入，遇到第一个失败即返回
    pub async fn update_config(&self, update: ConfigUpdate) -> Result<(), ConfigError> {
        for entry in update.into_entries() {
            self.update_config_key(entry).await?;
        }
        Ok(())
    }

    fn current_store(&self) -> Arc<dyn KeyValueStorePort> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 切换到内存存储
    async fn degrade_to_fallback(&self) -> Arc<dyn KeyValueStorePort> {
        if let Err(e) = self.fallback.init().await {
            tracing::error!(error = %e, "Fallback config store failed to initialize");
        }
        *self.store.write().unwrap_or_else(PoisonError::into_inner) = self.fallback.clone();
        self.persistent.store(false, Ordering::Release);
        self.fallback.clone()
    }

    /// 读取所有已知配置项；任何错误都回退到默认值
    async fn read_all(&self) -> ConfigValues {
        let store = self.current_store();

        if let Err(e) = store.init().await {
            tracing::warn!(
                error = %e,
                "Config store unavailable, settings will not persist this session"
            );
            self.degrade_to_fallback().await;
            return ConfigValues::default();
        }

        let mut stored: HashMap<ConfigKey, String> = HashMap::new();
        for key in ConfigKey::ALL {
            match store.get(key.as_str()).await {
                Ok(Some(value)) => {
                    stored.insert(key, value);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Error loading config, using defaults");
                    return ConfigValues::default();
                }
            }
        }

        let values = ConfigValues::from_stored(|key| stored.get(&key).cloned());

        if !values.api_key.is_empty() {
            tracing::info!("Using cached API key");
        }
        if !values.base_url.is_empty() {
            tracing::info!(base_url = %values.base_url, "Using cached base URL");
        }

        // 非敏感项缺失时写回默认值，敏感项只在用户显式设置时保存
        for key in ConfigKey::ALL
            .into_iter()
            .filter(|k| !k.is_sensitive() && !stored.contains_key(k))
        {
            let default = values.get(key).to_stored();
            if let Err(e) = store.set(key.as_str(), &default).await {
                tracing::warn!(key = %key, error = %e, "Failed to store default config value");
            }
        }

        values
    }
}
