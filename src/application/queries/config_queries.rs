//! Config Queries - 配置查询

use crate::application::services::ConfigState;
use crate::domain::settings::ConfigValues;

/// 获取当前配置
#[derive(Debug, Clone, Default)]
pub struct GetConfig;

/// 当前配置响应
#[derive(Debug, Clone)]
pub struct GetConfigResponse {
    pub values: ConfigValues,
    pub state: ConfigState,
    /// false 表示本次会话的配置不会持久化
    pub persistent: bool,
}
