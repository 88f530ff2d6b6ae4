//! Config Commands - 配置写入

/// 按名称更新单个配置项
#[derive(Debug, Clone)]
pub struct UpdateConfigKey {
    pub key: String,
    pub value: serde_json::Value,
}

/// 批量更新凭据与显示模式
///
/// 凭据为空字符串时删除对应存储项
#[derive(Debug, Clone, Default)]
pub struct UpdateConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub view_type: Option<String>,
}
