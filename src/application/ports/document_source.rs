//! Document Source Port - 文档文本来源
//!
//! 由文档渲染协作方提供的只读分页接口，核心逻辑不依赖渲染器本身

use async_trait::async_trait;

use crate::domain::document::{DocumentError, PageContent};

/// Document Source Port
#[async_trait]
pub trait DocumentSourcePort: Send + Sync {
    /// 总页数
    fn page_count(&self) -> usize;

    /// 读取指定页（从 0 开始）
    async fn page(&self, index: usize) -> Result<PageContent, DocumentError>;
}
