//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::ExportJobRecord;
use crate::application::GetConfigResponse;
use crate::application::services::ConfigState;
use crate::domain::document::PageContent;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Config DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UpdateConfigKeyRequest {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateConfigRequest {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub view_type: Option<String>,
}

/// 配置响应（apiKey 仅返回掩码）
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub api_key: String,
    pub api_key_set: bool,
    pub base_url: String,
    pub view_type: String,
    pub voice_speed: f64,
    pub voice: String,
    pub skip_blank: bool,
    pub epub_theme: bool,
    pub text_extraction_margin: f64,
    pub ready: bool,
    pub persistent: bool,
}

impl From<GetConfigResponse> for ConfigResponse {
    fn from(r: GetConfigResponse) -> Self {
        let values = r.values;
        Self {
            api_key: mask_secret(&values.api_key),
            api_key_set: !values.api_key.is_empty(),
            base_url: values.base_url,
            view_type: values.view_type.as_str().to_string(),
            voice_speed: values.voice_speed.value(),
            voice: values.voice,
            skip_blank: values.skip_blank,
            epub_theme: values.epub_theme,
            text_extraction_margin: values.text_extraction_margin.value(),
            ready: r.state == ConfigState::Ready,
            persistent: r.persistent,
        }
    }
}

/// 只保留末尾 4 个字符
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 8 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

#[derive(Debug, Serialize)]
pub struct UpdateConfigKeyResponseDto {
    pub key: String,
    pub persisted: bool,
}

// ============================================================================
// Export DTOs
// ============================================================================

/// 导出文档
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentDto {
    /// 已排版的页面（文本段 + 坐标）
    Layout { pages: Vec<PageContent> },
    /// 纯文本，换页符分页
    Text { content: String },
}

#[derive(Debug, Deserialize)]
pub struct SubmitExportRequest {
    pub document: DocumentDto,
}

#[derive(Debug, Serialize)]
pub struct SubmitExportResponseDto {
    pub job_id: Uuid,
    pub state: String,
    pub total_pages: usize,
}

#[derive(Debug, Deserialize)]
pub struct JobIdRequest {
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ExportJobResponse {
    pub job_id: Uuid,
    pub state: String,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl From<ExportJobRecord> for ExportJobResponse {
    fn from(job: ExportJobRecord) -> Self {
        Self {
            job_id: job.job_id,
            state: job.state.as_str().to_string(),
            progress: job.progress,
            error: job.error_message,
            created_at: job.created_at.to_rfc3339(),
            completed_at: job.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelExportResponseDto {
    pub job_id: Uuid,
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("short"), "****");
        assert_eq!(mask_secret("sk-1234567890abcd"), "****abcd");
    }

    #[test]
    fn test_document_dto_tags() {
        let text: SubmitExportRequest = serde_json::from_value(json!({
            "document": {"kind": "text", "content": "Hello."}
        }))
        .unwrap();
        assert!(matches!(text.document, DocumentDto::Text { .. }));

        let layout: SubmitExportRequest = serde_json::from_value(json!({
            "document": {"kind": "layout", "pages": [
                {"width": 100.0, "height": 100.0, "runs": [{"text": "Hi.", "x": 50.0, "y": 50.0}]}
            ]}
        }))
        .unwrap();
        match layout.document {
            DocumentDto::Layout { pages } => assert_eq!(pages[0].runs[0].text, "Hi."),
            other => panic!("unexpected document {:?}", other),
        }
    }
}
