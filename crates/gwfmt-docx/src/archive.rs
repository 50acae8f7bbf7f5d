//! Archive handling for DOCX files
//!
//! DOCX files are ZIP archives containing XML parts and resources.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::error::{DocxError, Result};

/// Path of the main document part
pub const DOCUMENT_PATH: &str = "word/document.xml";
/// Path of the document settings part
pub const SETTINGS_PATH: &str = "word/settings.xml";
/// Path of the content types part
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
/// Path of the document relationships part
pub const DOCUMENT_RELS_PATH: &str = "word/_rels/document.xml.rels";

/// Represents an unpacked DOCX document
#[derive(Debug)]
pub struct DocxArchive {
    /// All files in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl DocxArchive {
    /// Open and unpack a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Create a minimal single-document archive from scratch
    ///
    /// Used when the input is plain text and there is no existing package
    /// to modify.
    pub fn minimal(document_xml: String) -> Self {
        let mut files = HashMap::new();
        files.insert(
            CONTENT_TYPES_PATH.to_string(),
            MINIMAL_CONTENT_TYPES.as_bytes().to_vec(),
        );
        files.insert(
            "_rels/.rels".to_string(),
            MINIMAL_PACKAGE_RELS.as_bytes().to_vec(),
        );
        files.insert(
            DOCUMENT_RELS_PATH.to_string(),
            MINIMAL_DOCUMENT_RELS.as_bytes().to_vec(),
        );
        files.insert(DOCUMENT_PATH.to_string(), document_xml.into_bytes());
        Self { files }
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a file's contents as a string
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Get the main document content (word/document.xml)
    pub fn document_xml(&self) -> Result<String> {
        self.get_string(DOCUMENT_PATH)
            .ok_or_else(|| DocxError::MissingFile(DOCUMENT_PATH.to_string()))
    }

    /// Get the document settings (word/settings.xml), if present
    pub fn settings_xml(&self) -> Option<String> {
        self.get_string(SETTINGS_PATH)
    }

    /// Get the content types part
    pub fn content_types_xml(&self) -> Result<String> {
        self.get_string(CONTENT_TYPES_PATH)
            .ok_or_else(|| DocxError::MissingFile(CONTENT_TYPES_PATH.to_string()))
    }

    /// Get the document relationships part, if present
    pub fn document_rels_xml(&self) -> Option<String> {
        self.get_string(DOCUMENT_RELS_PATH)
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all files in the archive
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }

    /// Set or update a file's contents
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Set a file's contents from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.insert(path.into(), contents.into().into_bytes());
    }

    /// Write the archive to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the archive to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated);

        // Sort keys for deterministic output
        let mut paths: Vec<_> = self.files.keys().collect();
        paths.sort();

        for path in paths {
            let contents = &self.files[path];
            zip.start_file(path, options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}

const MINIMAL_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const MINIMAL_PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const MINIMAL_DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_file_operations() {
        let mut archive = DocxArchive {
            files: HashMap::new(),
        };

        archive.set_string("test.xml", "<root/>");
        assert!(archive.contains("test.xml"));
        assert_eq!(archive.get_string("test.xml"), Some("<root/>".to_string()));
    }

    #[test]
    fn test_minimal_archive_roundtrip() {
        let archive = DocxArchive::minimal("<w:document/>".to_string());

        let mut buffer = Cursor::new(Vec::new());
        archive.write_to(&mut buffer).unwrap();

        buffer.set_position(0);
        let restored = DocxArchive::from_reader(buffer).unwrap();
        assert!(restored.contains(DOCUMENT_PATH));
        assert!(restored.contains(CONTENT_TYPES_PATH));
        assert_eq!(restored.document_xml().unwrap(), "<w:document/>");
    }

    #[test]
    fn test_missing_document_part() {
        let archive = DocxArchive {
            files: HashMap::new(),
        };
        assert!(matches!(
            archive.document_xml(),
            Err(DocxError::MissingFile(_))
        ));
    }
}
