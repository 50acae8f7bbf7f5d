//! Paragraph and run formatting primitives
//!
//! Small transforms shared by the classifier and the locators. Each one
//! maps to a single visual effect of the house style; the classifier
//! decides which combination a block receives.

use gwfmt_docx::writer::cm_to_pt;
use gwfmt_docx::{Alignment, Paragraph, Run};

use crate::config::{FontSpec, StyleConfig};

/// Set family and size on one run, optionally forcing black text
pub fn set_run_font(run: &mut Run, font: &FontSpec, apply_color: bool) {
    run.props.font = Some(font.name.clone());
    run.props.size_pt = Some(font.size_pt);
    if apply_color {
        run.props.color = Some("000000".to_string());
    }
}

/// Apply one [`FontSpec`] to every plain run of a paragraph
pub fn apply_font_to_runs(para: &mut Paragraph, font: &FontSpec, apply_color: bool) {
    for run in para.runs_mut() {
        set_run_font(run, font, apply_color);
    }
}

/// Justified alignment with the standard two-character first-line indent
pub fn apply_standard_indent(para: &mut Paragraph, config: &StyleConfig) {
    para.format.clear_first_line_indent();
    para.format.left_indent_pt = Some(cm_to_pt(config.left_indent_cm));
    para.format.right_indent_pt = Some(cm_to_pt(config.right_indent_cm));
    para.format.first_line_chars = Some(200);
    para.alignment = Alignment::Justify;
}

/// Clear every pagination flag so Word lays the paragraph out plainly
pub fn reset_pagination(para: &mut Paragraph) {
    para.format.widow_control = Some(false);
    para.format.keep_next = Some(false);
    para.format.keep_lines = Some(false);
    para.format.page_break_before = false;
}

/// Zero the inter-paragraph spacing and set an exact line spacing
pub fn reset_spacing(para: &mut Paragraph, line_spacing_pt: f32) {
    para.format.before_autospacing = Some(false);
    para.format.after_autospacing = Some(false);
    para.format.space_before_pt = Some(0.0);
    para.format.space_after_pt = Some(0.0);
    para.format.set_line_spacing_pt(line_spacing_pt);
}

/// Outline level assignment; levels outside 1-9 are skipped with a warning
pub fn set_outline_level(para: &mut Paragraph, level: u8) {
    if !(1..=9).contains(&level) {
        log::warn!("outline level {level} out of range (1-9), skipped");
        return;
    }
    let previous = para.format.outline_level;
    // w:outlineLvl stores level 1-9 as 0-8
    para.format.outline_level = Some(level - 1);
    match previous {
        Some(old) => log::debug!("outline level: {} -> {level}", old + 1),
        None => log::debug!("outline level: none -> {level}"),
    }
}
