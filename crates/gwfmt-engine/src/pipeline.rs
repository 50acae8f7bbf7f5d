//! Per-document pipeline and batch orchestration
//!
//! One document runs convert -> preprocess -> classify/format -> finish
//! -> save. The original input is never mutated: .docx inputs are copied
//! to a temporary sibling first and all work happens on the copy. Batch
//! runs are sequential with per-file error isolation: one failure is
//! logged and counted, the rest of the batch continues.

use std::fs;
use std::path::{Path, PathBuf};

use gwfmt_docx::archive::DOCUMENT_PATH;
use gwfmt_docx::plaintext::{document_from_lines, read_text_lines};
use gwfmt_docx::writer::document_xml;
use gwfmt_docx::{Document, DocxArchive};
use log::{info, warn};

use crate::classify::Classifier;
use crate::config::StyleConfig;
use crate::error::{FormatError, Result};
use crate::page;

/// Converts a legacy word-processor file (.doc/.wps) to a .docx at the
/// returned path. Implementations typically drive an external office
/// automation process; the engine itself ships none.
pub trait LegacyConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Cleans up a .docx copy before formatting: accept tracked revisions,
/// convert automatic numbering to literal text. Failures are non-fatal;
/// formatting proceeds on the unmodified copy.
pub trait Preprocessor {
    fn preprocess(&self, path: &Path) -> Result<()>;
}

/// Temporary files for one document, removed best-effort when dropped
struct TempTracker {
    files: Vec<PathBuf>,
}

impl TempTracker {
    fn new() -> Self {
        Self { files: Vec::new() }
    }

    fn track(&mut self, path: PathBuf) -> PathBuf {
        self.files.push(path.clone());
        path
    }
}

impl Drop for TempTracker {
    fn drop(&mut self) {
        for path in self.files.drain(..) {
            if path.exists() {
                if let Err(err) = fs::remove_file(&path) {
                    warn!("failed to remove temp file {}: {err}", path.display());
                }
            }
        }
    }
}

/// Formats documents according to one style configuration
pub struct Formatter<'a> {
    config: &'a StyleConfig,
    converter: Option<Box<dyn LegacyConverter>>,
    preprocessor: Option<Box<dyn Preprocessor>>,
}

impl<'a> Formatter<'a> {
    pub fn new(config: &'a StyleConfig) -> Self {
        Self {
            config,
            converter: None,
            preprocessor: None,
        }
    }

    pub fn with_converter(mut self, converter: Box<dyn LegacyConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn with_preprocessor(mut self, preprocessor: Box<dyn Preprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    /// Format one document from `input` into `output`
    pub fn format_file(&self, input: &Path, output: &Path) -> Result<()> {
        info!("formatting {}", input.display());
        let mut temp = TempTracker::new();

        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let (mut doc, mut archive, from_plain_text) = match ext.as_str() {
            "docx" => {
                let copy = temp.track(temp_sibling(input, "~gwfmt_copy_", "docx"));
                fs::copy(input, &copy)?;
                self.run_preprocessor(&copy);
                let archive = DocxArchive::open(&copy)?;
                let doc = Document::parse(&archive.document_xml()?)?;
                (doc, archive, false)
            }
            "txt" => {
                let lines = read_text_lines(input)?;
                let doc = document_from_lines(&lines);
                let archive = DocxArchive::minimal(String::new());
                (doc, archive, true)
            }
            "doc" | "wps" => {
                let Some(converter) = self.converter.as_deref() else {
                    return Err(FormatError::Conversion(format!(
                        "no converter available for .{ext} input"
                    )));
                };
                let converted = temp.track(temp_sibling(input, "~gwfmt_converted_", "docx"));
                converter.convert(input, &converted)?;
                self.run_preprocessor(&converted);
                let archive = DocxArchive::open(&converted)?;
                let doc = Document::parse(&archive.document_xml()?)?;
                (doc, archive, false)
            }
            _ => return Err(FormatError::UnsupportedFormat(input.to_path_buf())),
        };

        Classifier::new(self.config, from_plain_text).run(&mut doc);
        page::finish(&mut doc, &mut archive, self.config)?;

        archive.set_string(DOCUMENT_PATH, document_xml(&doc));
        archive.write_to_file(output)?;
        info!("saved {}", output.display());
        Ok(())
    }

    fn run_preprocessor(&self, path: &Path) {
        if let Some(pre) = self.preprocessor.as_deref() {
            if let Err(err) = pre.preprocess(path) {
                warn!("preprocessing failed, continuing on unmodified copy: {err}");
            }
        }
    }
}

fn temp_sibling(input: &Path, prefix: &str, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("{prefix}{stem}.{ext}"))
}

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Input path and error text for each failure, in input order
    pub failures: Vec<(PathBuf, String)>,
}

/// Format many inputs into `output_dir`, one at a time. A failure on one
/// document does not stop the batch.
pub fn format_batch(formatter: &Formatter, inputs: &[PathBuf], output_dir: &Path) -> BatchSummary {
    let mut summary = BatchSummary::default();
    if let Err(err) = fs::create_dir_all(output_dir) {
        warn!("cannot create {}: {err}", output_dir.display());
    }
    for input in inputs {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let output = output_dir.join(format!("{stem}_formatted.docx"));
        match formatter.format_file(input, &output) {
            Ok(()) => summary.succeeded += 1,
            Err(err) => {
                warn!("failed to format {}: {err}", input.display());
                summary.failed += 1;
                summary.failures.push((input.clone(), err.to_string()));
            }
        }
    }
    info!(
        "batch finished: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
    summary
}
