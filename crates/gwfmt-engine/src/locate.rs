//! Title and subtitle location
//!
//! Official documents carry no semantic markup for their title block, so
//! it is recovered typographically: the title is a contiguous span of
//! centered paragraphs sharing one font identity, and a subtitle is a
//! following centered span whose font identity differs from the title's.
//! The same scan runs again inside attachment sections, starting just
//! after the marker line.

use std::collections::HashSet;

use gwfmt_docx::{Block, FontIdentity};
use log::debug;

use crate::patterns::heading_level;

/// Block positions of the located title and subtitle lines, in order.
/// Both lists may be empty; a subtitle never exists without a title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleSpans {
    pub title: Vec<usize>,
    pub subtitle: Vec<usize>,
}

/// Find the title and subtitle spans at or after `start_index`.
///
/// Plain-text sources have no alignment to go by, so the first non-blank
/// line is taken as the title unless it already reads as a tier-1 or
/// tier-2 heading. Rich sources require a centered paragraph before any
/// heading match. Blocks in `claimed` already have a role (captions) and
/// are passed over.
pub fn find_title_and_subtitle(
    blocks: &[Block],
    from_plain_text: bool,
    start_index: usize,
    claimed: &HashSet<usize>,
) -> TitleSpans {
    let mut first_title_idx = None;

    for (idx, block) in blocks.iter().enumerate().skip(start_index) {
        let Some(para) = block.as_paragraph() else {
            continue;
        };
        if para.is_blank() || claimed.contains(&idx) {
            continue;
        }
        if heading_level(&para.text()).is_some_and(|lvl| lvl <= 2) {
            debug!("heading found before any title candidate, no title block");
            return TitleSpans::default();
        }
        if from_plain_text {
            debug!("title starts at block {idx} (first non-blank line)");
            first_title_idx = Some(idx);
            break;
        }
        if para.is_centered() {
            debug!("title starts at block {idx} (first centered paragraph)");
            first_title_idx = Some(idx);
            break;
        }
    }

    let Some(first_idx) = first_title_idx else {
        return TitleSpans::default();
    };

    let title_identity = blocks[first_idx]
        .as_paragraph()
        .and_then(|p| p.first_font_identity());

    let mut title = vec![first_idx];
    let mut idx = first_idx + 1;
    while let Some(next) = span_member(blocks, idx, &title_identity, claimed) {
        title.push(next);
        idx += 1;
    }
    debug!("title span covers {} line(s)", title.len());

    // Blank lines may separate the title from a subtitle; a table ends
    // the search outright
    let mut subtitle_start = idx;
    while let Some(block) = blocks.get(subtitle_start) {
        match block.as_paragraph() {
            Some(p) if p.is_blank() => subtitle_start += 1,
            _ => break,
        }
    }

    let mut subtitle = Vec::new();
    if let Some(para) = blocks.get(subtitle_start).and_then(|b| b.as_paragraph()) {
        if !para.is_blank() && para.is_centered() && !claimed.contains(&subtitle_start) {
            let identity = para.first_font_identity();
            if identity != title_identity {
                debug!("subtitle starts at block {subtitle_start}");
                subtitle.push(subtitle_start);
                let mut idx = subtitle_start + 1;
                while let Some(next) = span_member(blocks, idx, &identity, claimed) {
                    subtitle.push(next);
                    idx += 1;
                }
            }
        }
    }

    TitleSpans { title, subtitle }
}

/// The block at `idx`, when it continues a span: an unclaimed centered
/// non-blank paragraph with the identical font identity
fn span_member(
    blocks: &[Block],
    idx: usize,
    identity: &Option<FontIdentity>,
    claimed: &HashSet<usize>,
) -> Option<usize> {
    let para = blocks.get(idx)?.as_paragraph()?;
    if para.is_blank() || !para.is_centered() || claimed.contains(&idx) {
        return None;
    }
    if &para.first_font_identity() != identity {
        return None;
    }
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwfmt_docx::{Alignment, Paragraph, ParagraphChild, Run, Table};

    fn para(text: &str, align: Alignment, font: Option<(&str, f32)>) -> Block {
        let mut p = Paragraph::default();
        p.alignment = align;
        let mut run = Run::new(text);
        if let Some((name, size)) = font {
            run.props.font = Some(name.to_string());
            run.props.size_pt = Some(size);
        }
        p.children.push(ParagraphChild::Run(run));
        Block::Paragraph(p)
    }

    fn blank() -> Block {
        Block::Paragraph(Paragraph::default())
    }

    #[test]
    fn three_line_centered_title() {
        let blocks = vec![
            blank(),
            para("关于进一步加强", Alignment::Center, Some(("方正小标宋简体", 22.0))),
            para("某某工作的", Alignment::Center, Some(("方正小标宋简体", 22.0))),
            para("通知", Alignment::Center, Some(("方正小标宋简体", 22.0))),
            blank(),
            para("正文开始。", Alignment::Unset, None),
        ];
        let spans = find_title_and_subtitle(&blocks, false, 0, &HashSet::new());
        assert_eq!(spans.title, vec![1, 2, 3]);
        assert!(spans.subtitle.is_empty());
    }

    #[test]
    fn different_font_starts_subtitle() {
        let blocks = vec![
            para("主标题", Alignment::Center, Some(("方正小标宋简体", 22.0))),
            para("——副标题", Alignment::Center, Some(("楷体_GB2312", 16.0))),
            para("正文。", Alignment::Unset, None),
        ];
        let spans = find_title_and_subtitle(&blocks, false, 0, &HashSet::new());
        assert_eq!(spans.title, vec![0]);
        assert_eq!(spans.subtitle, vec![1]);
    }

    #[test]
    fn identical_font_extends_title_instead() {
        let blocks = vec![
            para("主标题", Alignment::Center, Some(("方正小标宋简体", 22.0))),
            para("第二行", Alignment::Center, Some(("方正小标宋简体", 22.0))),
        ];
        let spans = find_title_and_subtitle(&blocks, false, 0, &HashSet::new());
        assert_eq!(spans.title, vec![0, 1]);
        assert!(spans.subtitle.is_empty());
    }

    #[test]
    fn heading_before_center_means_no_title() {
        let blocks = vec![
            para("一、开门见山", Alignment::Unset, None),
            para("居中段落", Alignment::Center, None),
        ];
        let spans = find_title_and_subtitle(&blocks, false, 0, &HashSet::new());
        assert_eq!(spans, TitleSpans::default());
    }

    #[test]
    fn plain_text_first_line_is_title() {
        let blocks = vec![
            blank(),
            para("关于某事项的通知", Alignment::Unset, None),
            para("正文第一段。", Alignment::Unset, None),
        ];
        let spans = find_title_and_subtitle(&blocks, true, 0, &HashSet::new());
        assert_eq!(spans.title, vec![1]);
        assert!(spans.subtitle.is_empty());
    }

    #[test]
    fn plain_text_heading_first_means_no_title() {
        let blocks = vec![para("（一）直接分条", Alignment::Unset, None)];
        let spans = find_title_and_subtitle(&blocks, true, 0, &HashSet::new());
        assert_eq!(spans, TitleSpans::default());
    }

    #[test]
    fn start_index_skips_main_body() {
        let blocks = vec![
            para("主标题", Alignment::Center, Some(("方正小标宋简体", 22.0))),
            para("附件1", Alignment::Unset, None),
            para("附表名称", Alignment::Center, Some(("方正小标宋简体", 22.0))),
        ];
        let spans = find_title_and_subtitle(&blocks, false, 2, &HashSet::new());
        assert_eq!(spans.title, vec![2]);
    }

    #[test]
    fn claimed_block_is_not_a_title_candidate() {
        let blocks = vec![
            para("表1 上年度数据", Alignment::Center, None),
            para("关于工作安排的通知", Alignment::Center, None),
        ];
        let claimed = HashSet::from([0]);
        let spans = find_title_and_subtitle(&blocks, false, 0, &claimed);
        assert_eq!(spans.title, vec![1]);
        assert!(spans.subtitle.is_empty());
    }

    #[test]
    fn subtitle_search_stops_at_table() {
        let blocks = vec![
            para("标题", Alignment::Center, Some(("方正小标宋简体", 22.0))),
            Block::Table(Table {
                xml: "<w:tbl/>".to_string(),
            }),
            para("居中段", Alignment::Center, Some(("黑体", 16.0))),
        ];
        let spans = find_title_and_subtitle(&blocks, false, 0, &HashSet::new());
        assert_eq!(spans.title, vec![0]);
        assert!(spans.subtitle.is_empty());
    }
}
