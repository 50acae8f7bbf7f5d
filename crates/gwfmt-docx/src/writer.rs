//! Serialization of the document model back to WordprocessingML
//!
//! The writer regenerates word/document.xml from `Document`, emits footer
//! parts, and patches [Content_Types].xml and settings.xml in place.
//! Verbatim fragments captured at parse time (tables, drawings, unmodeled
//! properties) are spliced back exactly as read.

use crate::document::{
    Alignment, Block, Document, HfRef, Paragraph, ParagraphChild, Run, RunProps, SectionProps,
};

/// Namespace declarations for the main document part. Raw content captured
/// from the source document may reference any of these prefixes, so the
/// full conventional set is declared.
const DOCUMENT_NS: &str = concat!(
    r#" xmlns:wpc="http://schemas.microsoft.com/office/word/2010/wordprocessingCanvas""#,
    r#" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006""#,
    r#" xmlns:o="urn:schemas-microsoft-com:office:office""#,
    r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
    r#" xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math""#,
    r#" xmlns:v="urn:schemas-microsoft-com:vml""#,
    r#" xmlns:wp14="http://schemas.microsoft.com/office/word/2010/wordprocessingDrawing""#,
    r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
    r#" xmlns:w10="urn:schemas-microsoft-com:office:word""#,
    r#" xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
    r#" xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml""#,
    r#" xmlns:wpg="http://schemas.microsoft.com/office/word/2010/wordprocessingGroup""#,
    r#" xmlns:wpi="http://schemas.microsoft.com/office/word/2010/wordprocessingInk""#,
    r#" xmlns:wne="http://schemas.microsoft.com/office/word/2006/wordml""#,
    r#" xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape""#,
    r#" mc:Ignorable="w14 wp14""#,
);

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub const FOOTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
pub const SETTINGS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";

/// Points to twentieths of a point, rounded
pub fn twips(pt: f32) -> i64 {
    (pt * 20.0).round() as i64
}

/// Centimeters to points
pub fn cm_to_pt(cm: f32) -> f32 {
    cm * 28.346_457
}

/// Serialize the whole main document part
pub fn document_xml(doc: &Document) -> String {
    let mut out = String::with_capacity(16 * 1024);
    out.push_str(XML_DECL);
    out.push_str("<w:document");
    out.push_str(DOCUMENT_NS);
    out.push_str("><w:body>");

    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => paragraph_xml(p, &mut out),
            Block::Table(t) => out.push_str(&t.xml),
        }
    }

    if let Some(sect) = &doc.body_section {
        out.push_str(&section_xml(sect));
    }

    out.push_str("</w:body></w:document>");
    out
}

fn paragraph_xml(p: &Paragraph, out: &mut String) {
    out.push_str("<w:p>");

    let ppr = ppr_xml(p);
    if !ppr.is_empty() {
        out.push_str("<w:pPr>");
        out.push_str(&ppr);
        out.push_str("</w:pPr>");
    }

    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => run_xml(r, out),
            ParagraphChild::Raw(xml) => out.push_str(xml),
        }
    }

    out.push_str("</w:p>");
}

fn ppr_xml(p: &Paragraph) -> String {
    let mut out = String::new();
    let fmt = &p.format;

    if let Some(style) = &p.style_id {
        out.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, escape_xml(style)));
    }
    push_on_off(&mut out, "w:keepNext", fmt.keep_next);
    push_on_off(&mut out, "w:keepLines", fmt.keep_lines);
    if fmt.page_break_before {
        out.push_str("<w:pageBreakBefore/>");
    }
    push_on_off(&mut out, "w:widowControl", fmt.widow_control);

    out.push_str(&p.extra_ppr);

    let has_spacing = fmt.space_before_pt.is_some()
        || fmt.space_after_pt.is_some()
        || fmt.before_autospacing.is_some()
        || fmt.after_autospacing.is_some()
        || fmt.line_twips.is_some();
    if has_spacing {
        out.push_str("<w:spacing");
        if let Some(pt) = fmt.space_before_pt {
            out.push_str(&format!(r#" w:before="{}""#, twips(pt)));
        }
        if let Some(flag) = fmt.before_autospacing {
            out.push_str(&format!(r#" w:beforeAutospacing="{}""#, onoff(flag)));
        }
        if let Some(pt) = fmt.space_after_pt {
            out.push_str(&format!(r#" w:after="{}""#, twips(pt)));
        }
        if let Some(flag) = fmt.after_autospacing {
            out.push_str(&format!(r#" w:afterAutospacing="{}""#, onoff(flag)));
        }
        if let Some(line) = fmt.line_twips {
            out.push_str(&format!(r#" w:line="{line}""#));
            if let Some(rule) = &fmt.line_rule {
                out.push_str(&format!(r#" w:lineRule="{}""#, escape_xml(rule)));
            }
        }
        out.push_str("/>");
    }

    let has_ind = fmt.first_line_pt.is_some()
        || fmt.first_line_chars.is_some()
        || fmt.hanging_pt.is_some()
        || fmt.left_indent_pt.is_some()
        || fmt.left_indent_chars.is_some()
        || fmt.right_indent_pt.is_some()
        || fmt.right_indent_chars.is_some();
    if has_ind {
        out.push_str("<w:ind");
        if let Some(pt) = fmt.left_indent_pt {
            out.push_str(&format!(r#" w:left="{}""#, twips(pt)));
        }
        if let Some(chars) = fmt.left_indent_chars {
            out.push_str(&format!(r#" w:leftChars="{chars}""#));
        }
        if let Some(pt) = fmt.right_indent_pt {
            out.push_str(&format!(r#" w:right="{}""#, twips(pt)));
        }
        if let Some(chars) = fmt.right_indent_chars {
            out.push_str(&format!(r#" w:rightChars="{chars}""#));
        }
        if let Some(pt) = fmt.hanging_pt {
            out.push_str(&format!(r#" w:hanging="{}""#, twips(pt)));
        }
        if let Some(pt) = fmt.first_line_pt {
            out.push_str(&format!(r#" w:firstLine="{}""#, twips(pt)));
        }
        if let Some(chars) = fmt.first_line_chars {
            out.push_str(&format!(r#" w:firstLineChars="{chars}""#));
        }
        out.push_str("/>");
    }

    if let Some(val) = p.alignment.as_val() {
        out.push_str(&format!(r#"<w:jc w:val="{val}"/>"#));
    }
    if let Some(lvl) = fmt.outline_level {
        out.push_str(&format!(r#"<w:outlineLvl w:val="{lvl}"/>"#));
    }
    out.push_str(&p.extra_ppr_end);
    if let Some(sect) = &p.section {
        out.push_str(&section_xml(sect));
    }

    out
}

fn run_xml(run: &Run, out: &mut String) {
    out.push_str("<w:r>");
    let rpr = rpr_xml(&run.props);
    if !rpr.is_empty() {
        out.push_str("<w:rPr>");
        out.push_str(&rpr);
        out.push_str("</w:rPr>");
    }

    // '\n' and '\t' in run text map back to break and tab elements
    let mut text = String::new();
    let flush = |text: &mut String, out: &mut String| {
        if !text.is_empty() {
            push_text_element(out, text);
            text.clear();
        }
    };
    for ch in run.text.chars() {
        match ch {
            '\n' => {
                flush(&mut text, out);
                out.push_str("<w:br/>");
            }
            '\t' => {
                flush(&mut text, out);
                out.push_str("<w:tab/>");
            }
            _ => text.push(ch),
        }
    }
    flush(&mut text, out);

    out.push_str("</w:r>");
}

fn push_text_element(out: &mut String, text: &str) {
    let needs_preserve = text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace);
    if needs_preserve {
        out.push_str(r#"<w:t xml:space="preserve">"#);
    } else {
        out.push_str("<w:t>");
    }
    out.push_str(&escape_xml(text));
    out.push_str("</w:t>");
}

pub(crate) fn rpr_xml(props: &RunProps) -> String {
    let mut out = String::new();
    if let Some(font) = &props.font {
        let name = escape_xml(font);
        out.push_str(&format!(
            r#"<w:rFonts w:ascii="{name}" w:eastAsia="{name}" w:hAnsi="{name}"/>"#
        ));
    }
    push_on_off(&mut out, "w:b", props.bold);
    push_on_off(&mut out, "w:i", props.italic);
    if let Some(color) = &props.color {
        out.push_str(&format!(r#"<w:color w:val="{}"/>"#, escape_xml(color)));
    }
    if let Some(pt) = props.size_pt {
        let half = (pt * 2.0).round() as i32;
        out.push_str(&format!(r#"<w:sz w:val="{half}"/><w:szCs w:val="{half}"/>"#));
    }
    if let Some(u) = props.underline {
        let val = if u { "single" } else { "none" };
        out.push_str(&format!(r#"<w:u w:val="{val}"/>"#));
    }
    out.push_str(&props.extra);
    out
}

fn section_xml(sect: &SectionProps) -> String {
    let mut out = String::from("<w:sectPr>");
    for hf in &sect.header_refs {
        out.push_str(&hf_ref_xml("w:headerReference", hf));
    }
    for hf in &sect.footer_refs {
        out.push_str(&hf_ref_xml("w:footerReference", hf));
    }
    out.push_str(&sect.extra_before);

    let has_pgmar = sect.margin_top_pt.is_some()
        || sect.margin_bottom_pt.is_some()
        || sect.margin_left_pt.is_some()
        || sect.margin_right_pt.is_some()
        || sect.header_distance_pt.is_some()
        || sect.footer_distance_pt.is_some()
        || sect.gutter_pt.is_some();
    if has_pgmar {
        out.push_str("<w:pgMar");
        for (attr, val) in [
            ("w:top", sect.margin_top_pt),
            ("w:right", sect.margin_right_pt),
            ("w:bottom", sect.margin_bottom_pt),
            ("w:left", sect.margin_left_pt),
            ("w:header", sect.header_distance_pt),
            ("w:footer", sect.footer_distance_pt),
            ("w:gutter", sect.gutter_pt),
        ] {
            if let Some(pt) = val {
                out.push_str(&format!(r#" {attr}="{}""#, twips(pt)));
            }
        }
        out.push_str("/>");
    }

    out.push_str(&sect.extra_after);
    out.push_str("</w:sectPr>");
    out
}

fn hf_ref_xml(name: &str, hf: &HfRef) -> String {
    format!(
        r#"<{name} w:type="{}" r:id="{}"/>"#,
        hf.kind.as_val(),
        escape_xml(&hf.rel_id)
    )
}

fn push_on_off(out: &mut String, name: &str, flag: Option<bool>) {
    match flag {
        Some(true) => out.push_str(&format!("<{name}/>")),
        Some(false) => out.push_str(&format!(r#"<{name} w:val="0"/>"#)),
        None => {}
    }
}

fn onoff(flag: bool) -> &'static str {
    if flag {
        "1"
    } else {
        "0"
    }
}

/// Serialize a footer part (word/footerN.xml) containing one paragraph
pub fn footer_part_xml(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    out.push_str(XML_DECL);
    out.push_str("<w:ftr");
    out.push_str(DOCUMENT_NS);
    out.push('>');
    paragraph_xml(paragraph, &mut out);
    out.push_str("</w:ftr>");
    out
}

/// A run holding a PAGE field, rendered with the given character props
pub fn page_field_run_xml(props: &RunProps) -> String {
    let rpr = {
        let body = rpr_xml(props);
        if body.is_empty() {
            String::new()
        } else {
            format!("<w:rPr>{body}</w:rPr>")
        }
    };
    format!(
        concat!(
            r#"<w:r>{rpr}<w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r>{rpr}<w:instrText xml:space="preserve"> PAGE </w:instrText></w:r>"#,
            r#"<w:r>{rpr}<w:fldChar w:fldCharType="end"/></w:r>"#,
        ),
        rpr = rpr
    )
}

/// Add an Override entry to [Content_Types].xml unless already present
pub fn add_content_type_override(content_types: &str, part_name: &str, content_type: &str) -> String {
    let marker = format!(r#"PartName="{part_name}""#);
    if content_types.contains(&marker) {
        return content_types.to_string();
    }
    let entry = format!(r#"<Override PartName="{part_name}" ContentType="{content_type}"/>"#);
    match content_types.rfind("</Types>") {
        Some(idx) => {
            let mut out = String::with_capacity(content_types.len() + entry.len());
            out.push_str(&content_types[..idx]);
            out.push_str(&entry);
            out.push_str(&content_types[idx..]);
            out
        }
        None => content_types.to_string(),
    }
}

const MINIMAL_SETTINGS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"</w:settings>"#,
);

/// Turn on odd/even footer distinction in settings.xml, creating a
/// minimal settings part when the document lacks one
pub fn set_even_odd_headers(settings: Option<&str>) -> String {
    let base = settings.unwrap_or(MINIMAL_SETTINGS);
    if base.contains("<w:evenAndOddHeaders") {
        return base.to_string();
    }
    match base.rfind("</w:settings>") {
        Some(idx) => {
            let mut out = String::with_capacity(base.len() + 32);
            out.push_str(&base[..idx]);
            out.push_str("<w:evenAndOddHeaders/>");
            out.push_str(&base[idx..]);
            out
        }
        // Self-closing settings element
        None => match base.rfind("/>") {
            Some(idx) => {
                let mut out = String::with_capacity(base.len() + 40);
                out.push_str(&base[..idx]);
                out.push_str("><w:evenAndOddHeaders/></w:settings>");
                out
            }
            None => base.to_string(),
        },
    }
}

/// Escape text content for inclusion in XML
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{HfKind, ParagraphFormat};

    #[test]
    fn paragraph_round_trip() {
        let src = concat!(
            r#"<w:p><w:pPr><w:spacing w:line="560" w:lineRule="exact"/>"#,
            r#"<w:ind w:firstLineChars="200"/><w:jc w:val="both"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:rFonts w:ascii="仿宋_GB2312" w:eastAsia="仿宋_GB2312" w:hAnsi="仿宋_GB2312"/>"#,
            r#"<w:sz w:val="32"/><w:szCs w:val="32"/></w:rPr><w:t>正文内容。</w:t></w:r></w:p>"#,
        );
        let xml = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{src}</w:body></w:document>"#
        );
        let doc = Document::parse(&xml).unwrap();
        let out = document_xml(&doc);
        assert!(out.contains(r#"<w:spacing w:line="560" w:lineRule="exact"/>"#));
        assert!(out.contains(r#"<w:ind w:firstLineChars="200"/>"#));
        assert!(out.contains(r#"<w:jc w:val="both"/>"#));
        assert!(out.contains(r#"<w:sz w:val="32"/><w:szCs w:val="32"/>"#));
        assert!(out.contains("正文内容。"));
    }

    #[test]
    fn spacing_from_points() {
        let mut p = Paragraph::default();
        p.format.space_before_pt = Some(0.0);
        p.format.space_after_pt = Some(0.0);
        p.format.before_autospacing = Some(false);
        p.format.after_autospacing = Some(false);
        p.format.set_line_spacing_pt(28.0);
        let mut out = String::new();
        paragraph_xml(&p, &mut out);
        assert!(out.contains(
            r#"<w:spacing w:before="0" w:beforeAutospacing="0" w:after="0" w:afterAutospacing="0" w:line="560" w:lineRule="exact"/>"#
        ));
    }

    #[test]
    fn page_break_and_widow_control() {
        let mut p = Paragraph::default();
        p.format.page_break_before = true;
        p.format.widow_control = Some(false);
        let mut out = String::new();
        paragraph_xml(&p, &mut out);
        assert!(out.contains("<w:pageBreakBefore/>"));
        assert!(out.contains(r#"<w:widowControl w:val="0"/>"#));
    }

    #[test]
    fn section_with_footer_refs() {
        let sect = SectionProps {
            footer_refs: vec![
                HfRef {
                    kind: HfKind::Default,
                    rel_id: "rId7".to_string(),
                },
                HfRef {
                    kind: HfKind::Even,
                    rel_id: "rId8".to_string(),
                },
            ],
            margin_top_pt: Some(104.9),
            footer_distance_pt: Some(70.9),
            ..Default::default()
        };
        let out = section_xml(&sect);
        assert!(out.contains(r#"<w:footerReference w:type="default" r:id="rId7"/>"#));
        assert!(out.contains(r#"<w:footerReference w:type="even" r:id="rId8"/>"#));
        assert!(out.contains(r#"w:top="2098""#));
        assert!(out.contains(r#"w:footer="1418""#));
    }

    #[test]
    fn page_field_run_structure() {
        let props = RunProps {
            font: Some("宋体".to_string()),
            size_pt: Some(14.0),
            ..Default::default()
        };
        let out = page_field_run_xml(&props);
        assert!(out.contains(r#"<w:fldChar w:fldCharType="begin"/>"#));
        assert!(out.contains(r#"<w:instrText xml:space="preserve"> PAGE </w:instrText>"#));
        assert!(out.contains(r#"<w:fldChar w:fldCharType="end"/>"#));
        assert_eq!(out.matches(r#"w:eastAsia="宋体""#).count(), 3);
    }

    #[test]
    fn content_type_override_added_once() {
        let base = r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;
        let once = add_content_type_override(base, "/word/footer1.xml", FOOTER_CONTENT_TYPE);
        let twice = add_content_type_override(&once, "/word/footer1.xml", FOOTER_CONTENT_TYPE);
        assert_eq!(once, twice);
        assert_eq!(once.matches("/word/footer1.xml").count(), 1);
    }

    #[test]
    fn even_odd_headers_created_and_idempotent() {
        let created = set_even_odd_headers(None);
        assert!(created.contains("<w:evenAndOddHeaders/>"));
        let patched = set_even_odd_headers(Some(&created));
        assert_eq!(patched.matches("evenAndOddHeaders").count(), 1);
    }

    #[test]
    fn preserve_space_on_padded_text() {
        let mut out = String::new();
        run_xml(&Run::new("— "), &mut out);
        assert!(out.contains(r#"<w:t xml:space="preserve">— </w:t>"#));
    }

    #[test]
    fn unset_format_emits_no_ppr() {
        let p = Paragraph {
            children: vec![ParagraphChild::Run(Run::new("x"))],
            format: ParagraphFormat::default(),
            ..Default::default()
        };
        let mut out = String::new();
        paragraph_xml(&p, &mut out);
        assert_eq!(out, "<w:p><w:r><w:t>x</w:t></w:r></w:p>");
    }
}
