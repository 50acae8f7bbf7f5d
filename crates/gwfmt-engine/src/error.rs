//! Error types for the formatting engine

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while formatting a document
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Legacy format conversion failed: {0}")]
    Conversion(String),

    #[error("Document error: {0}")]
    Docx(#[from] gwfmt_docx::DocxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FormatError>;
