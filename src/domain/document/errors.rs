//! Document Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Page out of range: {index} (total {total})")]
    PageOutOfRange { index: usize, total: usize },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Failed to read document: {0}")]
    ReadError(String),
}
