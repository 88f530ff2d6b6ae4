//! Config Command Handlers

use std::sync::Arc;

use crate::application::commands::{UpdateConfig, UpdateConfigKey};
use crate::application::error::ApplicationError;
use crate::application::services::{ConfigManager, ConfigUpdate};
use crate::domain::settings::{ConfigEntry, ConfigValues, ViewType};

// ============================================================================
// UpdateConfigKey
// ============================================================================

/// 单项更新响应
#[derive(Debug, Clone)]
pub struct UpdateConfigKeyResponse {
    pub entry: ConfigEntry,
    /// false 表示写入的是内存存储，重启后丢失
    pub persisted: bool,
}

/// UpdateConfigKey Handler
pub struct UpdateConfigKeyHandler {
    config_manager: Arc<ConfigManager>,
}

impl UpdateConfigKeyHandler {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    pub async fn handle(
        &self,
        command: UpdateConfigKey,
    ) -> Result<UpdateConfigKeyResponse, ApplicationError> {
        let entry = self
            .config_manager
            .update_by_name(&command.key, &command.value)
            .await?;

        tracing::info!(key = %entry.key(), "Config updated");

        Ok(UpdateConfigKeyResponse {
            entry,
            persisted: self.config_manager.is_persistent(),
        })
    }
}

// ============================================================================
// UpdateConfig
// ============================================================================

/// UpdateConfig Handler
pub struct UpdateConfigHandler {
    config_manager: Arc<ConfigManager>,
}

impl UpdateConfigHandler {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 返回更新后的配置快照
    pub async fn handle(&self, command: UpdateConfig) -> Result<ConfigValues, ApplicationError> {
        let view_type = command
            .view_type
            .as_deref()
            .map(|s| {
                ViewType::from_str(s)
                    .ok_or_else(|| ApplicationError::validation(format!("Invalid view type: {}", s)))
            })
            .transpose()?;

        let update = ConfigUpdate {
            api_key: command.api_key,
            base_url: command.base_url,
            view_type,
        };
        self.config_manager.update_config(update).await?;

        Ok(self.config_manager.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::KeyValueStorePort;
    use crate::infrastructure::memory::InMemoryKeyValueStore;
    use serde_json::json;

    fn manager() -> (Arc<ConfigManager>, Arc<InMemoryKeyValueStore>) {
        let store = InMemoryKeyValueStore::new().arc();
        let manager = ConfigManager::new(store.clone(), InMemoryKeyValueStore::new().arc()).arc();
        (manager, store)
    }

    #[tokio::test]
    async fn test_update_key_by_name() {
        let (manager, store) = manager();
        let handler = UpdateConfigKeyHandler::new(manager.clone());

        let response = handler
            .handle(UpdateConfigKey {
                key: "voiceSpeed".to_string(),
                value: json!(1.5),
            })
            .await
            .unwrap();

        assert!(response.persisted);
        assert_eq!(manager.snapshot().voice_speed.value(), 1.5);
        assert_eq!(store.get("voiceSpeed").await.unwrap().as_deref(), Some("1.5"));
    }

    #[tokio::test]
    async fn test_update_unknown_key_is_validation_error() {
        let (manager, _) = manager();
        let handler = UpdateConfigKeyHandler::new(manager);

        let result = handler
            .handle(UpdateConfigKey {
                key: "fontSize".to_string(),
                value: json!(12),
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_config_clears_credentials() {
        let (manager, store) = manager();
        let handler = UpdateConfigHandler::new(manager);

        handler
            .handle(UpdateConfig {
                api_key: Some("sk-test".to_string()),
                base_url: Some("https://tts.example.com".to_string()),
                view_type: Some("dual".to_string()),
            })
            .await
            .unwrap();
        assert!(store.contains_key("apiKey"));

        let values = handler
            .handle(UpdateConfig {
                api_key: Some(String::new()),
                ..UpdateConfig::default()
            })
            .await
            .unwrap();

        assert!(values.api_key.is_empty());
        assert_eq!(values.base_url, "https://tts.example.com");
        assert_eq!(values.view_type, ViewType::Dual);
        assert!(!store.contains_key("apiKey"));
    }

    #[tokio::test]
    async fn test_invalid_view_type_rejected() {
        let (manager, _) = manager();
        let handler = UpdateConfigHandler::new(manager);

        let result = handler
            .handle(UpdateConfig {
                view_type: Some("carousel".to_string()),
                ..UpdateConfig::default()
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));
    }
}
