//! Document Adapter - 文档来源实现

mod layout_document;
mod text_document;

pub use layout_document::LayoutDocument;
pub use text_document::TextDocument;
