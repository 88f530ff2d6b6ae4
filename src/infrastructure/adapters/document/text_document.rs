//! Text Document - 纯文本文档
//!
//! 以换页符 (U+000C) 分页，每个非空行作为一个位于页面中部的文本段，
//! 因此任何合法的边距设置都不会裁掉正文

use async_trait::async_trait;

use crate::application::ports::DocumentSourcePort;
use crate::domain::document::{DocumentError, PageContent, TextRun};

/// 换页符
const PAGE_BREAK: char = '\u{c}';

const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;

/// 纯文本分页文档
#[derive(Debug, Clone)]
pub struct TextDocument {
    pages: Vec<String>,
}

impl TextDocument {
    pub fn new(content: &str) -> Self {
        Self {
            pages: content.split(PAGE_BREAK).map(str::to_string).collect(),
        }
    }

    fn layout(text: &str) -> PageContent {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let n = lines.len() as f64;

        // 所有行落在页面中间一半的区域内
        let runs = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let y = PAGE_HEIGHT * (0.25 + 0.5 * (i as f64 + 1.0) / (n + 1.0));
                TextRun::new(*line, PAGE_WIDTH / 2.0, y)
            })
            .collect();

        PageContent::new(PAGE_WIDTH, PAGE_HEIGHT, runs)
    }
}

#[async_trait]
impl DocumentSourcePort for TextDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn page(&self, index: usize) -> Result<PageContent, DocumentError> {
        self.pages
            .get(index)
            .map(|text| Self::layout(text))
            .ok_or(DocumentError::PageOutOfRange {
                index,
                total: self.pages.len(),
            })
    }
}
