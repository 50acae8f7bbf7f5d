//! Structural text patterns
//!
//! Heading tiers in official documents follow a fixed numbering ladder:
//!
//! 1. `一、二、三、` (Chinese numerals with 、)
//! 2. `（一）（二）` (Chinese numerals in parentheses)
//! 3. `1. 2. 3.` (Arabic numerals with a dot)
//! 4. `（1）（2）` (Arabic numerals in parentheses)
//!
//! All matching happens on text with leading whitespace removed; drafts
//! routinely carry manual indents in front of heading numbers.

use std::sync::OnceLock;

use regex::Regex;

const CN_NUM: &str = "一二三四五六七八九十百千万零";

fn heading1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"^[{CN_NUM}]+\s*、")).unwrap())
}

fn heading2_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"^[（(][{CN_NUM}]+[）)]")).unwrap())
}

fn heading3_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\s*[.．]").unwrap())
}

fn heading4_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[（(]\d+[）)]").unwrap())
}

fn attachment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^附件\s*(?:\d+|[{CN_NUM}]+)?\s*[:：]?\s*$")).unwrap()
    })
}

/// Heading tier (1-4) of a line, or None for body text.
/// Tiers are checked in order, so 一、 wins over any later pattern.
pub fn heading_level(text: &str) -> Option<u8> {
    let text = text.trim_start();
    if heading1_re().is_match(text) {
        Some(1)
    } else if heading2_re().is_match(text) {
        Some(2)
    } else if heading3_re().is_match(text) {
        Some(3)
    } else if heading4_re().is_match(text) {
        Some(4)
    } else {
        None
    }
}

/// True for a standalone attachment marker line: 附件, 附件1, 附件2：
pub fn is_attachment_marker(text: &str) -> bool {
    attachment_re().is_match(text.trim())
}

/// What a caption line announces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionKind {
    Figure,
    Table,
}

/// Caption kind by the first character; the caller decides whether the
/// line's placement actually makes it a caption.
pub fn caption_kind(text: &str) -> Option<CaptionKind> {
    match text.trim_start().chars().next() {
        Some('图') => Some(CaptionKind::Figure),
        Some('表') => Some(CaptionKind::Table),
        _ => None,
    }
}

/// For a tier-2 heading carrying trailing body text: the char count of
/// the heading sentence including its closing 。, when non-whitespace
/// content follows it.
pub fn heading_sentence_len(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (stop_idx, _) = chars.by_ref().find(|&(_, c)| c == '。')?;
    let rest = &text[stop_idx + '。'.len_utf8()..];
    if rest.trim().is_empty() {
        return None;
    }
    Some(text[..stop_idx].chars().count() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_one_numbering() {
        assert_eq!(heading_level("一、总体要求"), Some(1));
        assert_eq!(heading_level("十二、附则"), Some(1));
        assert_eq!(heading_level("  三 、加强领导"), Some(1));
    }

    #[test]
    fn tier_two_numbering() {
        assert_eq!(heading_level("（一）提高认识"), Some(2));
        assert_eq!(heading_level("(二)落实责任"), Some(2));
    }

    #[test]
    fn tier_three_and_four() {
        assert_eq!(heading_level("1.健全机制"), Some(3));
        assert_eq!(heading_level("2．完善制度"), Some(3));
        assert_eq!(heading_level("（1）第一项"), Some(4));
        assert_eq!(heading_level("(2)第二项"), Some(4));
    }

    #[test]
    fn body_text_is_not_a_heading() {
        assert_eq!(heading_level("各地各部门要高度重视。"), None);
        assert_eq!(heading_level("2023年工作安排"), None);
        assert_eq!(heading_level("（详见附表）"), None);
    }

    #[test]
    fn tier_precedence() {
        // Matches tier 1 before anything later could apply
        assert_eq!(heading_level("一、1.混合编号"), Some(1));
    }

    #[test]
    fn attachment_markers() {
        assert!(is_attachment_marker("附件"));
        assert!(is_attachment_marker("附件1"));
        assert!(is_attachment_marker("附件2："));
        assert!(is_attachment_marker("附件 三:"));
        assert!(is_attachment_marker("  附件1  "));
        assert!(!is_attachment_marker("附件要求如下"));
        assert!(!is_attachment_marker("见附件1"));
    }

    #[test]
    fn caption_kinds() {
        assert_eq!(caption_kind("图1 系统架构"), Some(CaptionKind::Figure));
        assert_eq!(caption_kind("表2 统计结果"), Some(CaptionKind::Table));
        assert_eq!(caption_kind("正文内容"), None);
    }

    #[test]
    fn heading_sentence_split() {
        assert_eq!(
            heading_sentence_len("（一）提高认识。各级部门要充分认识"),
            Some(8)
        );
        // Nothing after the stop: no split
        assert_eq!(heading_sentence_len("（一）提高认识。"), None);
        assert_eq!(heading_sentence_len("（一）提高认识"), None);
    }
}
