//! Plain-text ingestion
//!
//! Draft documents often arrive as .txt files saved from legacy editors,
//! so decoding tries UTF-8 first and falls back to GBK. Each line becomes
//! one paragraph in a fresh document.

use std::fs;
use std::path::Path;

use encoding_rs::GBK;
use log::debug;

use crate::document::{Document, Block, Paragraph, Run};
use crate::error::{DocxError, Result};

/// Read a text file as lines, decoding UTF-8 with a GBK fallback
pub fn read_text_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)?;
    let text = decode_text(&bytes)
        .ok_or_else(|| DocxError::Encoding(path.display().to_string()))?;
    Ok(split_lines(&text))
}

/// Decode bytes as UTF-8, then GBK; None when neither decodes cleanly
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }
    debug!("input is not UTF-8, retrying as GBK");
    let (decoded, _, had_errors) = GBK.decode(bytes);
    if had_errors {
        None
    } else {
        Some(decoded.into_owned())
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(|line| line.to_string()).collect()
}

/// Build a document with one paragraph per input line. Lines are trimmed;
/// plain-text indentation is reconstructed by the formatter, not carried.
pub fn document_from_lines(lines: &[String]) -> Document {
    let blocks = lines
        .iter()
        .map(|line| {
            let mut para = Paragraph::default();
            let text = line.trim();
            if !text.is_empty() {
                para.children
                    .push(crate::document::ParagraphChild::Run(Run::new(text)));
            }
            Block::Paragraph(para)
        })
        .collect();
    Document {
        blocks,
        body_section: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_decodes_directly() {
        let text = decode_text("关于印发办法的通知\n正文".as_bytes()).unwrap();
        assert!(text.starts_with("关于"));
    }

    #[test]
    fn bom_is_stripped() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice("一、第一部分".as_bytes());
        assert_eq!(decode_text(&bytes).unwrap(), "一、第一部分");
    }

    #[test]
    fn gbk_fallback() {
        // "汉字" in GBK; 0xBA is not a valid UTF-8 lead byte, so this
        // cannot be read as UTF-8
        let bytes = [0xba, 0xba, 0xd7, 0xd6];
        assert_eq!(decode_text(&bytes).unwrap(), "汉字");
    }

    #[test]
    fn undecodable_bytes_rejected() {
        let bytes = [0xff, 0xff, 0x81, 0x00];
        assert!(decode_text(&bytes).is_none());
    }

    #[test]
    fn lines_become_paragraphs() {
        let lines = vec!["标题".to_string(), String::new(), "正文".to_string()];
        let doc = document_from_lines(&lines);
        assert_eq!(doc.blocks.len(), 3);
        assert!(doc.blocks[1].as_paragraph().unwrap().is_blank());
        assert_eq!(doc.blocks[2].as_paragraph().unwrap().text(), "正文");
    }
}
