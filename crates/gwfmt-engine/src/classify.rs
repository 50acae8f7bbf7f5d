//! Block classification and formatting
//!
//! One formatting run makes three passes over the body blocks:
//!
//! 1. caption pre-pass: claims the centered 图/表 line nearest to each
//!    table or image and applies the caption font,
//! 2. title pre-pass: locates the centered title/subtitle block and
//!    applies the title styles,
//! 3. main pass: walks the remaining blocks strictly left to right,
//!    assigning each exactly one label and applying its transform.
//!
//! The claimed set is shared across passes so a block is never formatted
//! twice. Attachment markers re-enter the title locator for the
//! attachment's own title block.

use std::collections::HashSet;

use gwfmt_docx::{Alignment, Block, Document, Paragraph, Run};
use log::{debug, info};

use crate::config::{FontSpec, StyleConfig};
use crate::label::Label;
use crate::locate::find_title_and_subtitle;
use crate::patterns::{caption_kind, heading_level, heading_sentence_len, is_attachment_marker, CaptionKind};
use crate::style::{
    apply_font_to_runs, apply_standard_indent, reset_pagination, reset_spacing, set_outline_level,
    set_run_font,
};

const DRAWING_MARKER: &str = "<w:drawing";
const PICT_MARKER: &str = "<w:pict";
const OBJECT_MARKER: &str = "<w:object";

/// Classifies and formats every block of one document
pub struct Classifier<'a> {
    config: &'a StyleConfig,
    from_plain_text: bool,
    /// Black text is forced only for rich sources; plain-text runs carry
    /// no color to begin with
    apply_color: bool,
    claimed: HashSet<usize>,
    labels: Vec<Option<Label>>,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a StyleConfig, from_plain_text: bool) -> Self {
        Self {
            config,
            from_plain_text,
            apply_color: !from_plain_text,
            claimed: HashSet::new(),
            labels: Vec::new(),
        }
    }

    /// Run all passes; returns the label assigned to each block
    pub fn run(mut self, doc: &mut Document) -> Vec<Label> {
        self.labels = vec![None; doc.blocks.len()];

        if !self.from_plain_text {
            self.claim_captions(doc);
        }
        self.locate_and_format_titles(doc);
        self.main_pass(doc);

        debug_assert!(self.labels.iter().all(|l| l.is_some()));
        self.labels
            .into_iter()
            .map(|l| l.unwrap_or(Label::Body))
            .collect()
    }

    fn set_label(&mut self, idx: usize, label: Label) {
        debug_assert!(self.labels[idx].is_none(), "block {idx} labeled twice");
        self.labels[idx] = Some(label);
    }

    // Caption pre-pass

    fn claim_captions(&mut self, doc: &mut Document) {
        info!("scanning for figure and table captions");
        for idx in 0..doc.blocks.len() {
            let is_anchor = match &doc.blocks[idx] {
                Block::Table(_) => true,
                Block::Paragraph(p) => {
                    p.has_raw_marker(DRAWING_MARKER) || p.has_raw_marker(PICT_MARKER)
                }
            };
            if !is_anchor {
                continue;
            }
            // Backward first; the first direction that yields a caption wins
            for step in [-1isize, 1] {
                if self.claim_caption_in_direction(doc, idx, step) {
                    break;
                }
            }
        }
    }

    /// Scan from the anchor in one direction for the nearest unclaimed
    /// non-blank paragraph; inspect it exactly once
    fn claim_caption_in_direction(&mut self, doc: &mut Document, anchor: usize, step: isize) -> bool {
        let mut i = anchor as isize + step;
        while i >= 0 && (i as usize) < doc.blocks.len() {
            let idx = i as usize;
            if self.claimed.contains(&idx) {
                i += step;
                continue;
            }
            let Block::Paragraph(para) = &mut doc.blocks[idx] else {
                return false;
            };
            let text = para.text();
            let text = text.trim();
            if text.is_empty() {
                i += step;
                continue;
            }
            if para.is_centered() {
                if let Some(kind) = caption_kind(text) {
                    let (font, label) = match kind {
                        CaptionKind::Figure => {
                            (&self.config.figure_caption_font, Label::FigureCaption)
                        }
                        CaptionKind::Table => (&self.config.table_caption_font, Label::TableCaption),
                    };
                    debug!("caption for block {anchor} found at block {idx}: {text:.30}");
                    apply_font_to_runs(para, font, self.apply_color);
                    self.claimed.insert(idx);
                    self.set_label(idx, label);
                    return true;
                }
            }
            return false;
        }
        false
    }

    // Title pre-pass

    fn locate_and_format_titles(&mut self, doc: &mut Document) {
        let spans = find_title_and_subtitle(&doc.blocks, self.from_plain_text, 0, &self.claimed);
        if !spans.title.is_empty() {
            info!("formatting main title ({} line(s))", spans.title.len());
        }
        for &idx in &spans.title {
            // A block the caption pre-pass claimed keeps its first label
            if !self.claimed.insert(idx) {
                continue;
            }
            self.set_label(idx, Label::Title);
            if let Some(para) = doc.blocks[idx].as_paragraph_mut() {
                format_title_line(
                    para,
                    &self.config.title_font,
                    self.config.title_line_spacing_pt,
                    self.apply_color,
                );
            }
        }
        for &idx in &spans.subtitle {
            if !self.claimed.insert(idx) {
                continue;
            }
            self.set_label(idx, Label::Subtitle);
            if let Some(para) = doc.blocks[idx].as_paragraph_mut() {
                format_title_line(
                    para,
                    &self.config.subtitle_font,
                    self.config.subtitle_line_spacing_pt,
                    self.apply_color,
                );
            }
        }
    }

    // Main pass

    fn main_pass(&mut self, doc: &mut Document) {
        info!("classifying {} block(s)", doc.blocks.len());
        let mut i = 0;
        while i < doc.blocks.len() {
            if self.claimed.contains(&i) {
                i += 1;
                continue;
            }

            let Block::Paragraph(para) = &mut doc.blocks[i] else {
                debug!("block {i}: table, skipped");
                self.set_label(i, Label::SkippedTable);
                i += 1;
                continue;
            };

            if para.is_blank() {
                self.set_label(i, Label::SkippedBlank);
                i += 1;
                continue;
            }

            // Paragraphs anchoring floating content get font changes only;
            // their layout must not be disturbed
            if para.has_raw_marker(DRAWING_MARKER)
                || para.has_raw_marker(PICT_MARKER)
                || para.has_raw_marker(OBJECT_MARKER)
            {
                let label = self.format_anchored_paragraph(i, doc);
                self.set_label(i, label);
                i += 1;
                continue;
            }

            let text = para.text();
            let trimmed_start = text.trim_start();
            let leading_ws = text.chars().count() - trimmed_start.chars().count();

            reset_spacing(para, self.config.line_spacing_pt);

            if self.config.enable_attachment_formatting
                && is_attachment_marker(&text)
                && (self.from_plain_text
                    || matches!(
                        para.alignment,
                        Alignment::Left | Alignment::Justify | Alignment::Unset
                    ))
            {
                i = self.format_attachment(doc, i);
                continue;
            }

            match heading_level(trimmed_start) {
                Some(1) => {
                    debug!("block {i}: tier-1 heading");
                    self.set_label(i, Label::Heading1);
                    self.format_plain_heading(doc, i, 1, true);
                }
                Some(2) => {
                    debug!("block {i}: tier-2 heading");
                    self.set_label(i, Label::Heading2);
                    self.format_heading2(doc, i);
                }
                Some(3) => {
                    debug!("block {i}: tier-3 heading");
                    self.set_label(i, Label::Heading3);
                    self.format_plain_heading(doc, i, 3, false);
                }
                Some(4) => {
                    debug!("block {i}: tier-4 heading");
                    self.set_label(i, Label::Heading4);
                    self.format_plain_heading(doc, i, 4, false);
                }
                _ => {
                    self.set_label(i, Label::Body);
                    self.format_body(doc, i, leading_ws);
                }
            }
            i += 1;
        }
    }

    /// Font-only treatment for a paragraph carrying a drawing, legacy
    /// picture, or embedded object
    fn format_anchored_paragraph(&self, i: usize, doc: &mut Document) -> Label {
        let Some(para) = doc.blocks[i].as_paragraph_mut() else {
            return Label::SkippedTable;
        };
        let text = para.text();
        let (font, label) = match heading_level(&text) {
            Some(1) => (&self.config.heading1_font, Label::Heading1),
            Some(2) => (&self.config.heading2_font, Label::Heading2),
            Some(3) => (&self.config.body_font, Label::Heading3),
            Some(4) => (&self.config.body_font, Label::Heading4),
            _ => (&self.config.body_font, Label::Body),
        };
        debug!("block {i}: anchored object, font-only formatting");
        apply_font_to_runs(para, font, self.apply_color);
        label
    }

    /// Tier 1, 3 and 4 headings share one shape; tier 1 keeps its own
    /// font while 3 and 4 render in the body font
    fn format_plain_heading(&self, doc: &mut Document, i: usize, level: u8, own_font: bool) {
        let Some(para) = doc.blocks[i].as_paragraph_mut() else {
            return;
        };
        para.strip_leading_whitespace();
        if self.config.set_outline {
            set_outline_level(para, level);
        }
        let font = if own_font {
            &self.config.heading1_font
        } else {
            &self.config.body_font
        };
        apply_font_to_runs(para, font, self.apply_color);
        apply_standard_indent(para, self.config);
        reset_pagination(para);
    }

    fn format_heading2(&self, doc: &mut Document, i: usize) {
        let Some(para) = doc.blocks[i].as_paragraph_mut() else {
            return;
        };
        para.strip_leading_whitespace();

        let text = para.text();
        if let Some(heading_chars) = heading_sentence_len(&text) {
            debug!("block {i}: heading and body share one paragraph, splitting runs");
            split_runs_at(
                para,
                heading_chars,
                &self.config.heading2_font,
                &self.config.body_font,
                self.apply_color,
            );
        } else {
            normalize_leading_parens(para);
            apply_font_to_runs(para, &self.config.heading2_font, self.apply_color);
        }

        if self.config.set_outline {
            set_outline_level(para, 2);
        }
        apply_standard_indent(para, self.config);
        reset_pagination(para);
    }

    /// An attachment marker and, when present, the attachment's own
    /// title/subtitle block. Returns the next unprocessed index.
    fn format_attachment(&mut self, doc: &mut Document, i: usize) -> usize {
        info!("block {i}: attachment marker");
        self.set_label(i, Label::AttachmentMarker);
        if let Some(para) = doc.blocks[i].as_paragraph_mut() {
            para.strip_leading_whitespace();
            apply_font_to_runs(para, &self.config.attachment_font, self.apply_color);
            reset_pagination(para);
            para.format.page_break_before = true;
            para.format.left_indent_pt = Some(0.0);
            para.format.clear_first_line_indent();
            para.format.first_line_chars = Some(0);
            para.alignment = Alignment::Left;
            if self.config.set_outline {
                set_outline_level(para, 1);
            }
        }

        let search_idx = i + 1;
        let spans =
            find_title_and_subtitle(&doc.blocks, self.from_plain_text, search_idx, &self.claimed);

        for &idx in &spans.title {
            if !self.claimed.insert(idx) {
                continue;
            }
            debug!("block {idx}: attachment title line");
            self.set_label(idx, Label::AttachmentTitle);
            if let Some(para) = doc.blocks[idx].as_paragraph_mut() {
                format_title_line(
                    para,
                    &self.config.title_font,
                    self.config.title_line_spacing_pt,
                    self.apply_color,
                );
                if self.config.set_outline {
                    set_outline_level(para, 1);
                }
            }
        }
        for &idx in &spans.subtitle {
            if !self.claimed.insert(idx) {
                continue;
            }
            debug!("block {idx}: attachment subtitle line");
            self.set_label(idx, Label::AttachmentSubtitle);
            if let Some(para) = doc.blocks[idx].as_paragraph_mut() {
                format_title_line(
                    para,
                    &self.config.subtitle_font,
                    self.config.subtitle_line_spacing_pt,
                    self.apply_color,
                );
            }
        }

        if let Some(&last) = spans.subtitle.iter().max() {
            last + 1
        } else if let Some(&last) = spans.title.iter().max() {
            last + 1
        } else {
            search_idx
        }
    }

    fn format_body(&self, doc: &mut Document, i: usize, leading_ws: usize) {
        let Some(para) = doc.blocks[i].as_paragraph_mut() else {
            return;
        };
        if self.from_plain_text {
            debug!("block {i}: body (plain-text source, standard indent)");
            para.strip_leading_whitespace();
            apply_font_to_runs(para, &self.config.body_font, self.apply_color);
            apply_standard_indent(para, self.config);
            reset_pagination(para);
            return;
        }

        match para.alignment {
            Alignment::Center | Alignment::Right => {
                debug!("block {i}: body, original alignment kept");
                apply_font_to_runs(para, &self.config.body_font, self.apply_color);
                reset_pagination(para);
            }
            _ if leading_ws > 5 => {
                debug!("block {i}: body, leading whitespace kept");
                apply_font_to_runs(para, &self.config.body_font, self.apply_color);
                para.alignment = Alignment::Justify;
                reset_pagination(para);
            }
            _ if para.format.explicit_first_line_indent_pt().unwrap_or(0.0) == 0.0
                && leading_ws == 0 =>
            {
                debug!("block {i}: body, flush-left kept");
                apply_font_to_runs(para, &self.config.body_font, self.apply_color);
                para.alignment = Alignment::Justify;
                reset_pagination(para);
            }
            _ => {
                debug!("block {i}: body, standard indent applied");
                para.strip_leading_whitespace();
                apply_font_to_runs(para, &self.config.body_font, self.apply_color);
                apply_standard_indent(para, self.config);
                reset_pagination(para);
            }
        }
    }
}

/// Title and subtitle lines share one shape, differing only in font and
/// line spacing
fn format_title_line(para: &mut Paragraph, font: &FontSpec, line_spacing_pt: f32, apply_color: bool) {
    para.strip_leading_whitespace();
    apply_font_to_runs(para, font, apply_color);
    para.alignment = Alignment::Center;
    para.format.clear_first_line_indent();
    reset_spacing(para, line_spacing_pt);
    reset_pagination(para);
}

/// Rebuild the paragraph's runs so the first `heading_chars` characters
/// carry the heading font and the remainder the body font. Each original
/// run's bold/italic/underline/color survives on every fragment derived
/// from it; the concatenated text is unchanged.
fn split_runs_at(
    para: &mut Paragraph,
    heading_chars: usize,
    heading_font: &FontSpec,
    body_font: &FontSpec,
    apply_color: bool,
) {
    let original: Vec<Run> = para.runs().cloned().collect();
    let mut rebuilt = Vec::with_capacity(original.len() + 1);
    let mut offset = 0usize;

    for src in original {
        let len = src.text.chars().count();
        let end = offset + len;

        let mut emit = |text: String, font: &FontSpec| {
            if text.is_empty() {
                return;
            }
            let mut run = Run::new(text);
            set_run_font(&mut run, font, apply_color);
            run.props.bold = src.props.bold;
            run.props.italic = src.props.italic;
            run.props.underline = src.props.underline;
            if src.props.color.is_some() {
                run.props.color = src.props.color.clone();
            }
            rebuilt.push(run);
        };

        if end <= heading_chars {
            emit(src.text.clone(), heading_font);
        } else if offset >= heading_chars {
            emit(src.text.clone(), body_font);
        } else {
            let split_at = heading_chars - offset;
            let head: String = src.text.chars().take(split_at).collect();
            let tail: String = src.text.chars().skip(split_at).collect();
            emit(head, heading_font);
            emit(tail, body_font);
        }
        offset = end;
    }

    para.replace_runs(rebuilt);
}

/// Replace the first half-width parenthesis pair with the full-width
/// form, run by run, unless the whole line is already parenthesized
fn normalize_leading_parens(para: &mut Paragraph) {
    let text = para.text();
    let trimmed = text.trim_start();
    if trimmed.starts_with('（') && trimmed.trim_end().ends_with('）') {
        return;
    }
    debug!("normalizing half-width parentheses in tier-2 heading");
    for run in para.runs_mut() {
        run.text = run.text.replacen('(', "（", 1).replacen(')', "）", 1);
    }
}
