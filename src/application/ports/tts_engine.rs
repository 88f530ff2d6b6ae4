//! TTS Engine Port - 语音合成引擎抽象
//!
//! 定义单个文本块合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::audiobook::AudioFragment;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    /// 传输层失败（连接、超时、读取响应体）
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 服务返回非成功状态码
    #[error("Service error: HTTP {status}: {body}")]
    ServiceError { status: u16, body: String },

    /// 请求被取消信号中止
    #[error("Request cancelled")]
    Cancelled,
}

impl TtsError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TtsError::Cancelled)
    }
}

/// 合成服务端点（每次导出开始时从配置快照得到）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsEndpoint {
    pub base_url: String,
    /// 为空时不发送 Authorization 头
    pub api_key: String,
}

impl TtsEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// 合成接口 URL
    pub fn synthesize_url(&self) -> String {
        format!("{}/synthesize", self.base_url.trim_end_matches('/'))
    }
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 对应文本块的序号
    pub sequence_index: usize,
    /// 要合成的文本
    pub text: String,
    /// 音色
    pub voice: String,
    /// 语速
    pub speed: f64,
    pub endpoint: TtsEndpoint,
}

/// TTS Engine Port
///
/// 无状态，可并发调用；不做任何重试，重试策略由调用方决定
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 合成单个文本块
    ///
    /// `cancel` 触发时中止进行中的请求并返回 `TtsError::Cancelled`
    async fn synthesize(
        &self,
        request: SynthesisRequest,
        cancel: &CancellationToken,
    ) -> Result<AudioFragment, TtsError>;

    /// 检查 TTS 服务是否可用
    async fn health_check(&self, _endpoint: &TtsEndpoint) -> bool {
        true // 默认实现
    }
}
