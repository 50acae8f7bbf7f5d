//! Error types for DOCX operations

use thiserror::Error;

/// Errors that can occur while reading or writing documents
#[derive(Error, Debug)]
pub enum DocxError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// Text file could not be decoded with any supported encoding
    #[error("Undecodable text file: {0}")]
    Encoding(String),
}

/// Result type for DOCX operations
pub type Result<T> = std::result::Result<T, DocxError>;
