//! Config Query Handlers

use std::sync::Arc;

use crate::application::queries::{GetConfig, GetConfigResponse};
use crate::application::services::ConfigManager;

/// GetConfig Handler
///
/// 加载完成前返回默认值，不等待
pub struct GetConfigHandler {
    config_manager: Arc<ConfigManager>,
}

impl GetConfigHandler {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    pub fn handle(&self, _query: GetConfig) -> GetConfigResponse {
        GetConfigResponse {
            values: self.config_manager.snapshot(),
            state: self.config_manager.state(),
            persistent: self.config_manager.is_persistent(),
        }
    }
}
