//! Chunk Extractor - 文本块提取
//!
//! 逐页读取文档，去除边距区域后切分为有序的文本块。
//! 提取是惰性、单次的：每次 `extract` 都从第 0 页重新开始

use std::collections::VecDeque;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::application::ports::DocumentSourcePort;
use crate::domain::document::{DocumentError, TextChunk};
use crate::domain::settings::{ConfigValues, MarginFraction};
use crate::domain::{segment_text, SegmentConfig};

/// 提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Extraction cancelled")]
    Cancelled,

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// 提取设置
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    /// 边距比例
    pub margin: MarginFraction,
    /// 跳过去除边距后为空的页面
    pub skip_blank: bool,
    /// 分句配置
    pub segment: SegmentConfig,
}

impl ExtractionSettings {
    pub fn from_config(values: &ConfigValues, segment: SegmentConfig) -> Self {
        Self {
            margin: values.text_extraction_margin,
            skip_blank: values.skip_blank,
            segment,
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            margin: MarginFraction::default(),
            skip_blank: true,
            segment: SegmentConfig::default(),
        }
    }
}

/// 提取统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// 已读取的页数
    pub pages_read: usize,
    /// 因空白被跳过的页数
    pub pages_skipped: usize,
    /// 已产出的文本块数
    pub chunks_emitted: usize,
}

/// 文本块提取器
#[derive(Debug, Clone, Default)]
pub struct ChunkExtractor {
    settings: ExtractionSettings,
}

impl ChunkExtractor {
    pub fn new(settings: ExtractionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// 开始一次新的提取（从第 0 页开始）
    pub fn extract(&self, source: Arc<dyn DocumentSourcePort>) -> ChunkStream {
        ChunkStream {
            total_pages: source.page_count(),
            source,
            settings: self.settings.clone(),
            next_page: 0,
            next_sequence: 0,
            pending: VecDeque::new(),
            stats: ExtractionStats::default(),
            finished: false,
        }
    }
}

/// 单次提取的文本块序列
///
/// 有限、单次遍历；结束或出错后持续返回 `None`
pub struct ChunkStream {
    source: Arc<dyn DocumentSourcePort>,
    settings: ExtractionSettings,
    total_pages: usize,
    next_page: usize,
    next_sequence: usize,
    pending: VecDeque<TextChunk>,
    stats: ExtractionStats,
    finished: bool,
}

impl ChunkStream {
    pub fn stats(&self) -> &ExtractionStats {
        &self.stats
    }

    /// 读取下一个文本块
    ///
    /// 每次调用都先检查取消信号，已取消时返回 `Cancelled`（包括文档已读完的情况）
    pub async fn next_chunk(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<Option<TextChunk>, ExtractError> {
        loop {
            // 取消优先于“已读完”，取消后的提取不会以正常结束收尾
            if cancel.is_cancelled() {
                self.finished = true;
                self.pending.clear();
                return Err(ExtractError::Cancelled);
            }
            if let Some(chunk) = self.pending.pop_front() {
                return Ok(Some(chunk));
            }
            if self.finished || self.next_page >= self.total_pages {
                self.finished = true;
                return Ok(None);
            }

            let page_index = self.next_page;
            self.next_page += 1;

            let page = match self.source.page(page_index).await {
                Ok(page) => page,
                Err(e) => {
                    self.finished = true;
                    return Err(e.into());
                }
            };
            self.stats.pages_read += 1;

            let text = page.retained_text(self.settings.margin);
            let pieces = segment_text(&text, &self.settings.segment);

            if pieces.is_empty() {
                if self.settings.skip_blank {
                    self.stats.pages_skipped += 1;
                    tracing::debug!(page_index = page_index, "Skipping blank page");
                } else {
                    tracing::debug!(page_index = page_index, "Page has no text after margin trimming");
                }
                continue;
            }

            for text in pieces {
                self.pending.push_back(TextChunk {
                    sequence_index: self.next_sequence,
                    page_index,
                    text,
                });
                self.next_sequence += 1;
                self.stats.chunks_emitted += 1;
            }
        }
    }

    /// 读取剩余全部文本块
    pub async fn collect_all(
        mut self,
        cancel: &CancellationToken,
    ) -> Result<Vec<TextChunk>, ExtractError> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next_chunk(cancel).await? {
            chunks.push(chunk);
        }

        tracing::debug!(
            pages_read = self.stats.pages_read,
            pages_skipped = self.stats.pages_skipped,
            chunks = chunks.len(),
            "Document text extracted"
        );
        Ok(chunks)
    }
}
