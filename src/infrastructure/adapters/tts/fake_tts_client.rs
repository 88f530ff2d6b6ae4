//! Fake TTS Client - 用于测试与离线演示的 TTS 客户端
//!
//! 不调用任何外部服务，按文本生成确定性的“音频”字节

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{SynthesisRequest, TtsEnginePort, TtsError};
use crate::domain::audiobook::AudioFragment;

/// Fake TTS Client 配置
#[derive(Debug, Clone, Default)]
pub struct FakeTtsClientConfig {
    /// 每个请求的模拟延迟
    pub delay: Duration,
    /// 指定文本块的额外延迟
    pub delay_for: HashMap<usize, Duration>,
    /// 返回 HTTP 500 的文本块
    pub fail_at: HashSet<usize>,
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// 请求结束（含被取消丢弃）时减少进行中计数
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FakeTtsClient {
    pub fn new() -> Self {
        Self::with_config(FakeTtsClientConfig::default())
    }

    pub fn with_config(config: FakeTtsClientConfig) -> Self {
        tracing::info!(delay_ms = config.delay.as_millis() as u64, "FakeTtsClient initialized");
        Self {
            config,
            requests: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    pub fn with_delay_for(mut self, sequence_index: usize, delay: Duration) -> Self {
        self.config.delay_for.insert(sequence_index, delay);
        self
    }

    pub fn with_failure_at(mut self, sequence_index: usize) -> Self {
        self.config.fail_at.insert(sequence_index);
        self
    }

    /// 已派发的请求数
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// 同时进行中的请求数峰值
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// 指定文本对应的输出字节
    pub fn payload_for(text: &str) -> Vec<u8> {
        format!("[{}]", text).into_bytes()
    }
}

impl Default for FakeTtsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
        cancel: &CancellationToken,
    ) -> Result<AudioFragment, TtsError> {
        if cancel.is_cancelled() {
            return Err(TtsError::Cancelled);
        }
        self.requests.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let delay = self.config.delay
            + self
                .config
                .delay_for
                .get(&request.sequence_index)
                .copied()
                .unwrap_or_default();

        if !delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(TtsError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if self.config.fail_at.contains(&request.sequence_index) {
            return Err(TtsError::ServiceError {
                status: 500,
                body: "fake failure".to_string(),
            });
        }

        tracing::debug!(chunk = request.sequence_index, "FakeTtsClient: returning payload");
        Ok(AudioFragment::new(
            request.sequence_index,
            Self::payload_for(&request.text),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::TtsEndpoint;

    fn request(index: usize) -> SynthesisRequest {
        SynthesisRequest {
            sequence_index: index,
            text: "Hello.".to_string(),
            voice: "af_sarah".to_string(),
            speed: 1.0,
            endpoint: TtsEndpoint::new("http://fake", ""),
        }
    }

    #[tokio::test]
    async fn test_deterministic_payload() {
        let client = FakeTtsClient::new();
        let fragment = client
            .synthesize(request(2), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(fragment.sequence_index, 2);
        assert_eq!(fragment.bytes, b"[Hello.]");
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_is_not_dispatched() {
        let client = FakeTtsClient::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.synthesize(request(0), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(client.request_count(), 0);
    }
}
