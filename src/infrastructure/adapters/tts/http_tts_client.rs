//! HTTP TTS Client - 调用外部 TTS HTTP 服务
//!
//! 实现 TtsEnginePort trait，每个文本块发送一次请求，不做重试
//!
//! 外部 TTS API:
//! POST {baseUrl}/synthesize
//! Request: {"text": "...", "voice": "af_sarah", "speed": 1.0}  (JSON)
//! Header: Authorization: {apiKey}（未配置时不发送）
//! Response: 音频二进制

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{SynthesisRequest, TtsEndpoint, TtsEnginePort, TtsError};
use crate::domain::audiobook::AudioFragment;

/// TTS 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    voice: &'a str,
    speed: f64,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

impl HttpTtsClientConfig {
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
///
/// 端点与凭据随每个请求传入，客户端本身无状态
pub struct HttpTtsClient {
    client: Client,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client })
    }

    /// 使用默认配置创建客户端
    pub fn with_default_config() -> Result<Self, TtsError> {
        Self::new(HttpTtsClientConfig::default())
    }

    fn health_url(endpoint: &TtsEndpoint) -> String {
        format!("{}/health", endpoint.base_url.trim_end_matches('/'))
    }

    async fn send(&self, request: &SynthesisRequest) -> Result<Vec<u8>, TtsError> {
        let url = request.endpoint.synthesize_url();
        let body = TtsHttpRequest {
            text: &request.text,
            voice: &request.voice,
            speed: request.speed,
        };

        tracing::debug!(
            url = %url,
            chunk = request.sequence_index,
            text_len = request.text.len(),
            voice = %request.voice,
            "Sending TTS synthesize request"
        );

        let mut builder = self.client.post(&url).json(&body);
        if !request.endpoint.api_key.is_empty() {
            builder = builder.header(AUTHORIZATION, &request.endpoint.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TtsError::NetworkError(format!("TTS request timed out: {}", e))
            } else if e.is_connect() {
                TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
            } else {
                TtsError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(status = status.as_u16(), error = %e, "Failed to read TTS error body");
                    format!("<failed to read response body: {}>", e)
                }
            };
            return Err(TtsError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| TtsError::NetworkError(format!("Failed to read audio: {}", e)))?;

        Ok(audio.to_vec())
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
        cancel: &CancellationToken,
    ) -> Result<AudioFragment, TtsError> {
        if cancel.is_cancelled() {
            return Err(TtsError::Cancelled);
        }

        // 取消时丢弃 future，reqwest 随之中止连接
        let audio = tokio::select! {
            _ = cancel.cancelled() => return Err(TtsError::Cancelled),
            result = self.send(&request) => result?,
        };

        tracing::debug!(
            chunk = request.sequence_index,
            audio_size = audio.len(),
            "TTS synthesis completed"
        );

        Ok(AudioFragment::new(request.sequence_index, audio))
    }

    async fn health_check(&self, endpoint: &TtsEndpoint) -> bool {
        match self
            .client
            .get(Self::health_url(endpoint))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::Value;
    use std::net::SocketAddr;

    /// 回显请求内容的本地 TTS 服务
    async fn synthesize(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Vec<u8>) {
        let text = body["text"].as_str().unwrap_or_default().to_string();
        match text.as_str() {
            "fail" => (StatusCode::INTERNAL_SERVER_ERROR, b"model crashed".to_vec()),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(10)).await;
                (StatusCode::OK, Vec::new())
            }
            _ => {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                let echo = format!("{}|{}|{}|{}", auth, text, body["voice"], body["speed"]);
                (StatusCode::OK, echo.into_bytes())
            }
        }
    }

    async fn spawn_server() -> SocketAddr {
        let app = Router::new()
            .route("/synthesize", post(synthesize))
            .route("/health", get(|| async { "ok" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn request(addr: SocketAddr, text: &str, api_key: &str) -> SynthesisRequest {
        SynthesisRequest {
            sequence_index: 4,
            text: text.to_string(),
            voice: "af_bella".to_string(),
            speed: 1.25,
            endpoint: TtsEndpoint::new(format!("http://{}/", addr), api_key),
        }
    }

    #[test]
    fn test_config_builder() {
        let config = HttpTtsClientConfig::default().with_timeout(60);
        assert_eq!(config.timeout_secs, 60);
    }

    #[tokio::test]
    async fn test_synthesize_sends_wire_format() {
        let addr = spawn_server().await;
        let client = HttpTtsClient::with_default_config().unwrap();

        let fragment = client
            .synthesize(request(addr, "Hello there.", "sk-test"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(fragment.sequence_index, 4);
        assert_eq!(
            String::from_utf8(fragment.bytes).unwrap(),
            "sk-test|Hello there.|\"af_bella\"|1.25"
        );
    }

    #[tokio::test]
    async fn test_empty_api_key_omits_authorization() {
        let addr = spawn_server().await;
        let client = HttpTtsClient::with_default_config().unwrap();

        let fragment = client
            .synthesize(request(addr, "Hi.", ""), &CancellationToken::new())
            .await
            .unwrap();
        assert!(String::from_utf8(fragment.bytes).unwrap().starts_with("-|"));
    }

    #[tokio::test]
    async fn test_non_success_is_service_error() {
        let addr = spawn_server().await;
        let client = HttpTtsClient::with_default_config().unwrap();

        let err = client
            .synthesize(request(addr, "fail", ""), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            TtsError::ServiceError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model crashed");
            }
            other => panic!("expected ServiceError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_truncated_error_body_is_reported() {
        use tokio::io::AsyncWriteExt;

        // 声明的长度大于实际发送的内容后直接断开
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 502 Bad Gateway\r\ncontent-length: 100\r\n\r\nupstream")
                .await;
            let _ = socket.shutdown().await;
        });

        let client = HttpTtsClient::with_default_config().unwrap();
        let err = client
            .synthesize(request(addr, "Hi.", ""), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            TtsError::ServiceError { status, body } => {
                assert_eq!(status, 502);
                assert!(body.starts_with("<failed to read response body"));
            }
            other => panic!("expected ServiceError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let addr = spawn_server().await;
        let client = HttpTtsClient::with_default_config().unwrap();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = client
            .synthesize(request(addr, "slow", ""), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpTtsClient::with_default_config().unwrap();
        let err = client
            .synthesize(request(addr, "Hi.", ""), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let addr = spawn_server().await;
        let client = HttpTtsClient::with_default_config().unwrap();
        let endpoint = TtsEndpoint::new(format!("http://{}", addr), "");
        assert!(client.health_check(&endpoint).await);
    }
}
