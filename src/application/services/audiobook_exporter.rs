//! Audiobook Exporter - 整书导出
//!
//! 提取全部文本块后以有限窗口并发合成，片段按序号拼接为一个缓冲区

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::chunk_extractor::{ChunkExtractor, ExtractError, ExtractionSettings};
use crate::application::ports::{DocumentSourcePort, SynthesisRequest, TtsEndpoint, TtsEnginePort, TtsError};
use crate::domain::audiobook::{AudioFragment, ExportJob, FragmentAssembler};
use crate::domain::document::DocumentError;
use crate::domain::settings::ConfigValues;
use crate::domain::SegmentConfig;

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export cancelled")]
    Cancelled,

    #[error("Export failed at chunk {failed_index}: {cause}")]
    ExportFailed {
        failed_index: usize,
        #[source]
        cause: TtsError,
    },

    #[error("Text extraction failed: {0}")]
    Extraction(#[from] DocumentError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExportError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExportError::Cancelled)
    }
}

impl From<ExtractError> for ExportError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Cancelled => ExportError::Cancelled,
            ExtractError::Document(e) => ExportError::Extraction(e),
        }
    }
}

/// 单次导出使用的设置快照
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub voice: String,
    pub speed: f64,
    pub endpoint: TtsEndpoint,
    pub extraction: ExtractionSettings,
}

impl ExportSettings {
    /// 从配置快照构建；未配置 baseUrl 时使用 `default_url`
    pub fn from_config(values: &ConfigValues, default_url: &str, segment: SegmentConfig) -> Self {
        let base_url = if values.base_url.is_empty() {
            default_url.to_string()
        } else {
            values.base_url.clone()
        };

        Self {
            voice: values.voice.clone(),
            speed: values.voice_speed.value(),
            endpoint: TtsEndpoint::new(base_url, values.api_key.clone()),
            extraction: ExtractionSettings::from_config(values, segment),
        }
    }
}

/// 导出器配置
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// 同时进行中的合成请求上限
    pub max_in_flight: usize,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self { max_in_flight: 3 }
    }
}

/// 有声书导出器
pub struct AudiobookExporter {
    engine: Arc<dyn TtsEnginePort>,
    config: ExporterConfig,
}

impl AudiobookExporter {
    pub fn new(engine: Arc<dyn TtsEnginePort>, config: ExporterConfig) -> Self {
        Self { engine, config }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 导出整本书
    ///
    /// 每完成一个片段回调一次 `on_progress`（0..=100，单调不减），
    /// 只有全部成功时才会报告 100。任一片段失败立即中止，进行中的请求随之丢弃
    pub async fn create_full_audiobook<F>(
        &self,
        document: Arc<dyn DocumentSourcePort>,
        settings: &ExportSettings,
        mut on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ExportError>
    where
        F: FnMut(f64) + Send,
    {
        let chunks = ChunkExtractor::new(settings.extraction.clone())
            .extract(document)
            .collect_all(cancel)
            .await?;

        let mut job = ExportJob::new(chunks.len());
        if cancel.is_cancelled() {
            return Err(Self::abort(&mut job));
        }
        if chunks.is_empty() {
            tracing::info!("Document has no text, exporting empty audiobook");
            on_progress(job.percent());
            return Ok(Vec::new());
        }

        tracing::info!(
            chunks = chunks.len(),
            max_in_flight = self.config.max_in_flight,
            voice = %settings.voice,
            "Starting audiobook export"
        );

        let mut assembler = FragmentAssembler::new(chunks.len());
        let engine = &self.engine;

        let requests = chunks.into_iter().map(|chunk| {
            let request = SynthesisRequest {
                sequence_index: chunk.sequence_index,
                text: chunk.text,
                voice: settings.voice.clone(),
                speed: settings.speed,
                endpoint: settings.endpoint.clone(),
            };
            async move {
                let index = request.sequence_index;
                // 派发前检查取消
                if cancel.is_cancelled() {
                    return (index, Err(TtsError::Cancelled));
                }
                (index, engine.synthesize(request, cancel).await)
            }
        });

        let mut in_flight = stream::iter(requests).buffer_unordered(self.config.max_in_flight.max(1));

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Self::abort(&mut job)),
                next = in_flight.next() => next,
            };
            let Some((index, result)) = next else {
                break;
            };

            match result {
                Ok(fragment) => {
                    assembler.insert(AudioFragment::new(index, fragment.bytes));
                    let percent = job.complete_one();
                    tracing::debug!(chunk = index, percent = percent, "Chunk synthesized");
                    on_progress(percent);
                }
                Err(e) if e.is_cancelled() => return Err(Self::abort(&mut job)),
                Err(cause) => {
                    tracing::warn!(chunk = index, error = %cause, "Chunk synthesis failed");
                    return Err(ExportError::ExportFailed {
                        failed_index: index,
                        cause,
                    });
                }
            }
        }

        let buffer = assembler
            .assemble()
            .ok_or_else(|| ExportError::Internal("missing audio fragments".to_string()))?;

        tracing::info!(bytes = buffer.len(), "Audiobook export finished");
        Ok(buffer)
    }

    /// 标记取消，已收到的片段随调用结束丢弃
    fn abort(job: &mut ExportJob) -> ExportError {
        job.cancelled = true;
        tracing::info!(
            completed = job.completed_chunks,
            total = job.total_chunks,
            "Audiobook export cancelled"
        );
        ExportError::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{PageContent, TextRun};
    use crate::domain::settings::MarginFraction;
    use crate::infrastructure::adapters::{FakeTtsClient, LayoutDocument};
    use std::sync::Mutex;
    use std::time::Duration;

    fn document(pages: &[&[&str]]) -> Arc<dyn DocumentSourcePort> {
        let pages = pages
            .iter()
            .map(|lines| {
                let runs = lines
                    .iter()
                    .enumerate()
                    .map(|(i, text)| TextRun::new(*text, 300.0, 200.0 + i as f64 * 20.0))
                    .collect();
                PageContent::new(600.0, 800.0, runs)
            })
            .collect();
        Arc::new(LayoutDocument::new(pages))
    }

    fn settings() -> ExportSettings {
        ExportSettings {
            voice: "af_sarah".to_string(),
            speed: 1.0,
            endpoint: TtsEndpoint::new("http://tts.invalid", ""),
            extraction: ExtractionSettings {
                margin: MarginFraction::default(),
                skip_blank: true,
                segment: SegmentConfig {
                    min_chars: 1,
                    max_chars: 480,
                },
            },
        }
    }

    fn exporter(engine: FakeTtsClient) -> AudiobookExporter {
        AudiobookExporter::new(Arc::new(engine), ExporterConfig { max_in_flight: 3 })
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_100() {
        let doc = document(&[&["One.", "Two."], &["Three.", "Four."]]);
        let progress = Mutex::new(Vec::new());

        let buffer = exporter(FakeTtsClient::new())
            .create_full_audiobook(
                doc,
                &settings(),
                |p| progress.lock().unwrap().push(p),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let progress = progress.into_inner().unwrap();
        assert_eq!(progress.len(), 4);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*progress.last().unwrap(), 100.0);
        assert_eq!(progress.iter().filter(|p| **p == 100.0).count(), 1);
        assert!(!buffer.is_empty());
    }

    #[tokio::test]
    async fn test_slow_middle_chunk_keeps_assembly_order() {
        let doc = document(&[&["Alpha.", "Beta.", "Gamma."]]);
        let engine = FakeTtsClient::new().with_delay_for(1, Duration::from_millis(80));

        let buffer = exporter(engine)
            .create_full_audiobook(doc, &settings(), |_| {}, &CancellationToken::new())
            .await
            .unwrap();

        let expected: Vec<u8> = ["Alpha.", "Beta.", "Gamma."]
            .iter()
            .flat_map(|t| FakeTtsClient::payload_for(t))
            .collect();
        assert_eq!(buffer, expected);
    }

    #[tokio::test]
    async fn test_cancellation_stops_dispatch() {
        let lines: Vec<String> = (0..12).map(|i| format!("Sentence {}.", i)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let doc = document(&[&refs]);

        let engine = Arc::new(FakeTtsClient::new().with_delay(Duration::from_millis(30)));
        let exporter = AudiobookExporter::new(engine.clone(), ExporterConfig { max_in_flight: 2 });
        let cancel = CancellationToken::new();

        // 记录触发取消那一刻已派发的请求数
        let dispatched_at_cancel = Arc::new(Mutex::new(None));
        let trigger = cancel.clone();
        let observed = engine.clone();
        let recorded = dispatched_at_cancel.clone();
        let result = exporter
            .create_full_audiobook(
                doc,
                &settings(),
                move |p| {
                    if p > 0.0 && !trigger.is_cancelled() {
                        *recorded.lock().unwrap() = Some(observed.request_count());
                        trigger.cancel();
                    }
                },
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(ExportError::Cancelled)));

        let at_cancel = dispatched_at_cancel.lock().unwrap().expect("progress was reported");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(engine.request_count(), at_cancel);
        assert!(at_cancel < 12);
    }

    #[tokio::test]
    async fn test_in_flight_requests_stay_within_window() {
        let lines: Vec<String> = (0..10).map(|i| format!("Line {}.", i)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let doc = document(&[&refs]);

        let engine = Arc::new(FakeTtsClient::new().with_delay(Duration::from_millis(20)));
        let exporter = AudiobookExporter::new(engine.clone(), ExporterConfig { max_in_flight: 3 });

        exporter
            .create_full_audiobook(doc, &settings(), |_| {}, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(engine.request_count(), 10);
        assert!(engine.peak_in_flight() <= 3);
        assert!(engine.peak_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_cancelled_blank_document_is_rejected() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        for doc in [document(&[]), document(&[&[], &[]])] {
            let mut progress = Vec::new();
            let result = exporter(FakeTtsClient::new())
                .create_full_audiobook(doc, &settings(), |p| progress.push(p), &cancel)
                .await;

            assert!(matches!(result, Err(ExportError::Cancelled)));
            assert!(progress.is_empty());
        }
    }

    #[tokio::test]
    async fn test_failed_chunk_reports_index() {
        let doc = document(&[&["Fine.", "Broken.", "Fine again."]]);
        let engine = FakeTtsClient::new().with_failure_at(1);

        let result = exporter(engine)
            .create_full_audiobook(doc, &settings(), |_| {}, &CancellationToken::new())
            .await;

        match result {
            Err(ExportError::ExportFailed { failed_index, cause }) => {
                assert_eq!(failed_index, 1);
                assert!(matches!(cause, TtsError::ServiceError { status: 500, .. }));
            }
            other => panic!("expected ExportFailed, got {:?}", other.map(|b| b.len())),
        }
    }

    #[tokio::test]
    async fn test_empty_document_reports_100_once() {
        let doc = document(&[&[], &[]]);
        let mut progress = Vec::new();

        let buffer = exporter(FakeTtsClient::new())
            .create_full_audiobook(doc, &settings(), |p| progress.push(p), &CancellationToken::new())
            .await
            .unwrap();

        assert!(buffer.is_empty());
        assert_eq!(progress, vec![100.0]);
    }

    #[test]
    fn test_settings_fall_back_to_default_url() {
        let values = ConfigValues::default();
        let settings = ExportSettings::from_config(&values, "http://localhost:8880", SegmentConfig::default());
        assert_eq!(settings.endpoint.base_url, "http://localhost:8880");
        assert_eq!(settings.voice, "af_sarah");
        assert_eq!(settings.speed, 1.0);

        let values = ConfigValues {
            base_url: "https://tts.example.com".to_string(),
            ..ConfigValues::default()
        };
        let settings = ExportSettings::from_config(&values, "http://localhost:8880", SegmentConfig::default());
        assert_eq!(settings.endpoint.base_url, "https://tts.example.com");
    }
}
