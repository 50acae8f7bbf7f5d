//! DOCX package access for the gwfmt formatting engine
//!
//! This crate reads and writes the parts of an OOXML word-processing
//! package the formatter touches:
//!
//! - `archive`: the zip container, with deterministic rewriting
//! - `document`: the body content model (paragraphs, runs, sections)
//! - `writer`: serialization back to WordprocessingML
//! - `relationships`: the document relationship part, for footer wiring
//! - `plaintext`: .txt ingestion with UTF-8/GBK decoding
//!
//! Content the model does not interpret (tables, drawings, embedded
//! objects, unknown properties) is carried through verbatim so a rewrite
//! never loses it.

pub mod archive;
pub mod document;
pub mod error;
pub mod plaintext;
pub mod relationships;
pub mod writer;

pub use archive::DocxArchive;
pub use document::{
    Alignment, Block, Document, FontIdentity, HfKind, HfRef, Paragraph, ParagraphChild,
    ParagraphFormat, Run, RunProps, SectionProps, Table,
};
pub use error::{DocxError, Result};
pub use relationships::Relationships;
