//! Layout Document - 已解析好版面的文档
//!
//! 页面内容由渲染端提供（每页文本段 + 坐标），整体保存在内存中

use async_trait::async_trait;

use crate::application::ports::DocumentSourcePort;
use crate::domain::document::{DocumentError, PageContent};

/// 内存中的分页文档
#[derive(Debug, Clone, Default)]
pub struct LayoutDocument {
    pages: Vec<PageContent>,
}

impl LayoutDocument {
    pub fn new(pages: Vec<PageContent>) -> Self {
        Self { pages }
    }

    /// 校验页面尺寸与坐标后构建
    pub fn validated(pages: Vec<PageContent>) -> Result<Self, DocumentError> {
        for (index, page) in pages.iter().enumerate() {
            let valid_size = page.width.is_finite()
                && page.height.is_finite()
                && page.width > 0.0
                && page.height > 0.0;
            if !valid_size {
                return Err(DocumentError::InvalidDocument(format!(
                    "page {} has invalid size {}x{}",
                    index, page.width, page.height
                )));
            }
            if let Some(run) = page.runs.iter().find(|r| !r.x.is_finite() || !r.y.is_finite()) {
                return Err(DocumentError::InvalidDocument(format!(
                    "page {} has a text run with invalid position ({}, {})",
                    index, run.x, run.y
                )));
            }
        }
        Ok(Self::new(pages))
    }
}

#[async_trait]
impl DocumentSourcePort for LayoutDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn page(&self, index: usize) -> Result<PageContent, DocumentError> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(DocumentError::PageOutOfRange {
                index,
                total: self.pages.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::TextRun;

    #[tokio::test]
    async fn test_page_out_of_range() {
        let doc = LayoutDocument::new(vec![PageContent::new(10.0, 10.0, vec![])]);
        assert_eq!(doc.page_count(), 1);
        assert!(doc.page(0).await.is_ok());
        assert!(matches!(
            doc.page(1).await,
            Err(DocumentError::PageOutOfRange { index: 1, total: 1 })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_geometry() {
        let zero_width = PageContent::new(0.0, 10.0, vec![]);
        assert!(LayoutDocument::validated(vec![zero_width]).is_err());

        let nan_run = PageContent::new(10.0, 10.0, vec![TextRun::new("x", f64::NAN, 1.0)]);
        assert!(LayoutDocument::validated(vec![nan_run]).is_err());
    }
}
