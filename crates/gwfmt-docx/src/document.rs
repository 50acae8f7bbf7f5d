//! Document content model and parsing (word/document.xml)
//!
//! This module parses the main document part into an ordered sequence of
//! block-level elements and keeps enough raw XML around that unmodeled
//! content (tables, drawings, section plumbing) survives a rewrite
//! untouched.
//!
//! Blocks are identified by their position in `Document::blocks`; the
//! formatting engine mutates paragraphs in place and the writer serializes
//! the whole body back out.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{DocxError, Result};

/// Paragraph alignment (w:jc)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    /// No explicit alignment on the paragraph
    #[default]
    Unset,
}

impl Alignment {
    fn from_val(val: &str) -> Self {
        match val {
            "left" | "start" => Alignment::Left,
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" | "justify" | "distribute" => Alignment::Justify,
            _ => Alignment::Unset,
        }
    }

    /// The w:jc value, or None when unset
    pub fn as_val(&self) -> Option<&'static str> {
        match self {
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
            Alignment::Justify => Some("both"),
            Alignment::Unset => None,
        }
    }
}

/// Character-level run formatting (w:rPr)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProps {
    /// Font family, applied to both the ascii and east-asian slots
    pub font: Option<String>,
    /// Font size in points (w:sz is half-points)
    pub size_pt: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    /// RRGGBB hex or "auto"
    pub color: Option<String>,
    /// Verbatim rPr children this model does not interpret
    pub extra: String,
}

/// A text run with formatting
///
/// Line breaks and tabs inside the run are represented as '\n' and '\t'
/// in `text` and restored as w:br / w:tab on write.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub props: RunProps,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            props: RunProps::default(),
        }
    }
}

/// Child elements of a paragraph
#[derive(Debug, Clone, PartialEq)]
pub enum ParagraphChild {
    /// A plain text run
    Run(Run),
    /// Verbatim XML for anything else: drawings, fields, hyperlinks,
    /// bookmarks, embedded objects
    Raw(String),
}

/// Paragraph-level formatting (w:pPr), measurements in points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphFormat {
    pub first_line_pt: Option<f32>,
    /// w:firstLineChars, hundredths of a character
    pub first_line_chars: Option<i32>,
    pub hanging_pt: Option<f32>,
    pub left_indent_pt: Option<f32>,
    pub left_indent_chars: Option<i32>,
    pub right_indent_pt: Option<f32>,
    pub right_indent_chars: Option<i32>,
    pub space_before_pt: Option<f32>,
    pub space_after_pt: Option<f32>,
    pub before_autospacing: Option<bool>,
    pub after_autospacing: Option<bool>,
    /// w:spacing w:line, twentieths of a point
    pub line_twips: Option<i32>,
    pub line_rule: Option<String>,
    /// 0-based outline level (w:outlineLvl)
    pub outline_level: Option<u8>,
    pub page_break_before: bool,
    pub widow_control: Option<bool>,
    pub keep_next: Option<bool>,
    pub keep_lines: Option<bool>,
}

impl ParagraphFormat {
    /// Set an exact line spacing in points
    pub fn set_line_spacing_pt(&mut self, pt: f32) {
        self.line_twips = Some((pt * 20.0).round() as i32);
        self.line_rule = Some("exact".to_string());
    }

    /// Explicit first-line indent in points: w:firstLine, or the negated
    /// w:hanging. Character-unit indents are not reported here.
    pub fn explicit_first_line_indent_pt(&self) -> Option<f32> {
        if let Some(h) = self.hanging_pt {
            return Some(-h);
        }
        self.first_line_pt
    }

    /// Remove the explicit first-line indent (leaves character units alone)
    pub fn clear_first_line_indent(&mut self) {
        self.first_line_pt = None;
        self.hanging_pt = None;
    }
}

/// A paragraph with its content and formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub style_id: Option<String>,
    pub alignment: Alignment,
    pub format: ParagraphFormat,
    pub children: Vec<ParagraphChild>,
    /// Verbatim pPr children this model does not interpret
    pub extra_ppr: String,
    /// Verbatim pPr children that must come after jc/outlineLvl in the
    /// schema: the paragraph-mark run properties and the like
    pub extra_ppr_end: String,
    /// Section properties attached to this paragraph (a section break)
    pub section: Option<SectionProps>,
}

impl Paragraph {
    /// Concatenated text of all plain runs, in order
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                ParagraphChild::Run(r) => Some(r.text.as_str()),
                ParagraphChild::Raw(_) => None,
            })
            .collect()
    }

    /// True when the paragraph has no visible text
    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }

    pub fn is_centered(&self) -> bool {
        self.alignment == Alignment::Center
    }

    /// Number of leading whitespace characters in the paragraph text
    pub fn leading_whitespace_len(&self) -> usize {
        let text = self.text();
        text.chars().count() - text.trim_start().chars().count()
    }

    /// Check the raw markup of opaque children for a marker such as
    /// "<w:drawing" or "<w:object"
    pub fn has_raw_marker(&self, marker: &str) -> bool {
        self.children.iter().any(|c| match c {
            ParagraphChild::Raw(xml) => xml.contains(marker),
            ParagraphChild::Run(_) => false,
        })
    }

    /// Iterate plain runs
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.children.iter().filter_map(|c| match c {
            ParagraphChild::Run(r) => Some(r),
            ParagraphChild::Raw(_) => None,
        })
    }

    /// Iterate plain runs mutably
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.children.iter_mut().filter_map(|c| match c {
            ParagraphChild::Run(r) => Some(r),
            ParagraphChild::Raw(_) => None,
        })
    }

    /// Replace the paragraph content with a fresh run list
    pub fn replace_runs(&mut self, runs: Vec<Run>) {
        self.children = runs.into_iter().map(ParagraphChild::Run).collect();
    }

    /// Font family and size of the first run that carries visible text
    pub fn first_font_identity(&self) -> Option<FontIdentity> {
        self.runs()
            .find(|r| !r.text.trim().is_empty())
            .map(|r| FontIdentity {
                font: r.props.font.clone(),
                size_pt: r.props.size_pt,
            })
    }

    /// Drop leading whitespace-only runs and left-trim the first real run
    pub fn strip_leading_whitespace(&mut self) {
        loop {
            let Some(idx) = self
                .children
                .iter()
                .position(|c| matches!(c, ParagraphChild::Run(_)))
            else {
                return;
            };
            let ParagraphChild::Run(run) = &mut self.children[idx] else {
                unreachable!()
            };
            if run.text.trim().is_empty() {
                self.children.remove(idx);
                continue;
            }
            let stripped = run.text.trim_start();
            if stripped.len() != run.text.len() {
                run.text = stripped.to_string();
            }
            return;
        }
    }
}

/// Typographic identity used for title/subtitle span matching
#[derive(Debug, Clone, PartialEq)]
pub struct FontIdentity {
    pub font: Option<String>,
    pub size_pt: Option<f32>,
}

/// A table; never reformatted, carried through verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub xml: String,
}

/// Block-level elements in document order
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl Block {
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }
}

/// Header/footer reference kind (w:headerReference / w:footerReference)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HfKind {
    Default,
    Even,
    First,
}

impl HfKind {
    fn from_val(val: &str) -> Self {
        match val {
            "even" => HfKind::Even,
            "first" => HfKind::First,
            _ => HfKind::Default,
        }
    }

    pub fn as_val(&self) -> &'static str {
        match self {
            HfKind::Default => "default",
            HfKind::Even => "even",
            HfKind::First => "first",
        }
    }
}

/// A header or footer reference inside sectPr
#[derive(Debug, Clone, PartialEq)]
pub struct HfRef {
    pub kind: HfKind,
    pub rel_id: String,
}

/// Section properties (w:sectPr), page geometry in points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionProps {
    pub header_refs: Vec<HfRef>,
    pub footer_refs: Vec<HfRef>,
    pub margin_top_pt: Option<f32>,
    pub margin_bottom_pt: Option<f32>,
    pub margin_left_pt: Option<f32>,
    pub margin_right_pt: Option<f32>,
    pub header_distance_pt: Option<f32>,
    pub footer_distance_pt: Option<f32>,
    pub gutter_pt: Option<f32>,
    /// Verbatim children ordered before pgMar (type, pgSz, footnotePr...)
    pub extra_before: String,
    /// Verbatim children ordered after pgMar (cols, docGrid, titlePg...)
    pub extra_after: String,
}

/// A parsed document body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Body blocks in document order
    pub blocks: Vec<Block>,
    /// The trailing body-level section properties
    pub body_section: Option<SectionProps>,
}

impl Document {
    /// Parse a document from the XML of word/document.xml
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut blocks = Vec::new();
        let mut body_section = None;
        let mut in_body = false;

        loop {
            let pos = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"body" => in_body = true,
                    b"p" if in_body => {
                        blocks.push(Block::Paragraph(parse_paragraph(&mut reader, xml, pos)?));
                    }
                    b"tbl" if in_body => {
                        let raw = capture_element(&mut reader, xml, pos, &e)?;
                        blocks.push(Block::Table(Table { xml: raw }));
                    }
                    b"sectPr" if in_body => {
                        let raw = capture_element(&mut reader, xml, pos, &e)?;
                        body_section = Some(parse_section(&raw)?);
                    }
                    _ if in_body => {
                        // Structured-document tags, bookmarks and the like:
                        // opaque, skipped by classification, written back
                        // verbatim
                        let raw = capture_element(&mut reader, xml, pos, &e)?;
                        blocks.push(Block::Table(Table { xml: raw }));
                    }
                    _ => {}
                },
                Event::Empty(e) if in_body => match e.local_name().as_ref() {
                    b"p" => blocks.push(Block::Paragraph(Paragraph::default())),
                    b"sectPr" => body_section = Some(SectionProps::default()),
                    _ => {
                        let raw = capture_empty(&reader, xml, pos);
                        blocks.push(Block::Table(Table { xml: raw }));
                    }
                },
                Event::End(e) if e.local_name().as_ref() == b"body" => break,
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Document {
            blocks,
            body_section,
        })
    }

    /// All section properties in the document: paragraph-level section
    /// breaks in order, then the body-level trailer
    pub fn sections_mut(&mut self) -> Vec<&mut SectionProps> {
        let mut out: Vec<&mut SectionProps> = Vec::new();
        for block in &mut self.blocks {
            if let Block::Paragraph(p) = block {
                if let Some(sect) = p.section.as_mut() {
                    out.push(sect);
                }
            }
        }
        if let Some(sect) = self.body_section.as_mut() {
            out.push(sect);
        }
        out
    }
}

// Element parsing

/// Slice the verbatim XML of the element whose Start event was just read.
/// `start` must be the byte offset of the opening '<'.
fn capture_element(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    start: usize,
    e: &BytesStart,
) -> Result<String> {
    let end_name = e.to_end().into_owned();
    reader.read_to_end(end_name.name())?;
    let end = reader.buffer_position() as usize;
    Ok(xml[start..end].to_string())
}

/// Slice the verbatim XML of a self-closing element just read at `start`.
fn capture_empty(reader: &Reader<&[u8]>, xml: &str, start: usize) -> String {
    let end = reader.buffer_position() as usize;
    xml[start..end].to_string()
}

fn parse_paragraph(reader: &mut Reader<&[u8]>, xml: &str, _start: usize) -> Result<Paragraph> {
    let mut para = Paragraph::default();

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"pPr" => parse_ppr(reader, xml, &mut para)?,
                b"r" => {
                    let child = parse_run(reader, xml, pos)?;
                    para.children.push(child);
                }
                _ => {
                    // Hyperlinks, smart tags, field containers: carried raw
                    let raw = capture_element(reader, xml, pos, &e)?;
                    para.children.push(ParagraphChild::Raw(raw));
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"pPr" => {}
                _ => {
                    let raw = capture_empty(reader, xml, pos);
                    para.children.push(ParagraphChild::Raw(raw));
                }
            },
            Event::End(e) if e.local_name().as_ref() == b"p" => break,
            Event::Eof => {
                return Err(DocxError::InvalidStructure(
                    "unterminated paragraph".to_string(),
                ))
            }
            _ => {}
        }
    }

    Ok(para)
}

/// Uninterpreted pPr children that CT_PPr places after <w:outlineLvl>
const PPR_TRAILING: &[&[u8]] = &[b"rPr", b"divId", b"cnfStyle", b"pPrChange"];

fn keep_ppr_verbatim(para: &mut Paragraph, name: &[u8], raw: &str) {
    if PPR_TRAILING.contains(&name) {
        para.extra_ppr_end.push_str(raw);
    } else {
        para.extra_ppr.push_str(raw);
    }
}

fn parse_ppr(reader: &mut Reader<&[u8]>, xml: &str, para: &mut Paragraph) -> Result<()> {
    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sectPr" => {
                    let raw = capture_element(reader, xml, pos, &e)?;
                    para.section = Some(parse_section(&raw)?);
                }
                _ => {
                    if !apply_ppr_child(&e, para) {
                        let raw = capture_element(reader, xml, pos, &e)?;
                        keep_ppr_verbatim(para, e.local_name().as_ref(), &raw);
                    } else {
                        // Known element written with Start/End form
                        let end_name = e.to_end().into_owned();
                        reader.read_to_end(end_name.name())?;
                    }
                }
            },
            Event::Empty(e) => {
                if !apply_ppr_child(&e, para) {
                    let raw = capture_empty(reader, xml, pos);
                    keep_ppr_verbatim(para, e.local_name().as_ref(), &raw);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"pPr" => break,
            Event::Eof => {
                return Err(DocxError::InvalidStructure(
                    "unterminated pPr".to_string(),
                ))
            }
            _ => {}
        }
    }
    Ok(())
}

/// Interpret a known pPr child; returns false when the element is not
/// modeled and must be kept verbatim.
fn apply_ppr_child(e: &BytesStart, para: &mut Paragraph) -> bool {
    let fmt = &mut para.format;
    match e.local_name().as_ref() {
        b"pStyle" => {
            para.style_id = get_attr(e, b"w:val");
            true
        }
        b"jc" => {
            if let Some(val) = get_attr(e, b"w:val") {
                para.alignment = Alignment::from_val(&val);
            }
            true
        }
        b"ind" => {
            fmt.first_line_pt = attr_twips_pt(e, b"w:firstLine");
            fmt.first_line_chars = attr_i32(e, b"w:firstLineChars");
            fmt.hanging_pt = attr_twips_pt(e, b"w:hanging");
            fmt.left_indent_pt = attr_twips_pt(e, b"w:left").or(attr_twips_pt(e, b"w:start"));
            fmt.left_indent_chars = attr_i32(e, b"w:leftChars");
            fmt.right_indent_pt = attr_twips_pt(e, b"w:right").or(attr_twips_pt(e, b"w:end"));
            fmt.right_indent_chars = attr_i32(e, b"w:rightChars");
            true
        }
        b"spacing" => {
            fmt.space_before_pt = attr_twips_pt(e, b"w:before");
            fmt.space_after_pt = attr_twips_pt(e, b"w:after");
            fmt.before_autospacing = attr_bool(e, b"w:beforeAutospacing");
            fmt.after_autospacing = attr_bool(e, b"w:afterAutospacing");
            fmt.line_twips = attr_i32(e, b"w:line");
            fmt.line_rule = get_attr(e, b"w:lineRule");
            true
        }
        b"outlineLvl" => {
            fmt.outline_level = get_attr(e, b"w:val").and_then(|v| v.parse().ok());
            true
        }
        b"pageBreakBefore" => {
            fmt.page_break_before = attr_bool(e, b"w:val").unwrap_or(true);
            true
        }
        b"widowControl" => {
            fmt.widow_control = Some(attr_bool(e, b"w:val").unwrap_or(true));
            true
        }
        b"keepNext" => {
            fmt.keep_next = Some(attr_bool(e, b"w:val").unwrap_or(true));
            true
        }
        b"keepLines" => {
            fmt.keep_lines = Some(attr_bool(e, b"w:val").unwrap_or(true));
            true
        }
        _ => false,
    }
}

/// Parse a run; opaque content (drawings, fields, embedded objects)
/// makes the whole run a raw child so nothing is lost on rewrite.
fn parse_run(reader: &mut Reader<&[u8]>, xml: &str, start: usize) -> Result<ParagraphChild> {
    let mut run = Run::new("");
    let mut opaque = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPr" => parse_rpr(reader, xml, &mut run.props)?,
                b"t" => in_text = true,
                _ => {
                    opaque = true;
                    let end_name = e.to_end().into_owned();
                    reader.read_to_end(end_name.name())?;
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"t" | b"rPr" => {}
                b"br" | b"cr" => run.text.push('\n'),
                b"tab" => run.text.push('\t'),
                _ => opaque = true,
            },
            Event::Text(t) => {
                if in_text {
                    run.text.push_str(&t.unescape().unwrap_or_default());
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => break,
                _ => {}
            },
            Event::Eof => {
                return Err(DocxError::InvalidStructure(
                    "unterminated run".to_string(),
                ))
            }
            _ => {}
        }
    }

    if opaque {
        let end = reader.buffer_position() as usize;
        Ok(ParagraphChild::Raw(xml[start..end].to_string()))
    } else {
        Ok(ParagraphChild::Run(run))
    }
}

fn parse_rpr(reader: &mut Reader<&[u8]>, xml: &str, props: &mut RunProps) -> Result<()> {
    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                if !apply_rpr_child(&e, props) {
                    let raw = capture_element(reader, xml, pos, &e)?;
                    props.extra.push_str(&raw);
                } else {
                    let end_name = e.to_end().into_owned();
                    reader.read_to_end(end_name.name())?;
                }
            }
            Event::Empty(e) => {
                if !apply_rpr_child(&e, props) {
                    let raw = capture_empty(reader, xml, pos);
                    props.extra.push_str(&raw);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"rPr" => break,
            Event::Eof => {
                return Err(DocxError::InvalidStructure(
                    "unterminated rPr".to_string(),
                ))
            }
            _ => {}
        }
    }
    Ok(())
}

fn apply_rpr_child(e: &BytesStart, props: &mut RunProps) -> bool {
    match e.local_name().as_ref() {
        b"rFonts" => {
            props.font = get_attr(e, b"w:eastAsia").or_else(|| get_attr(e, b"w:ascii"));
            true
        }
        b"sz" => {
            props.size_pt = get_attr(e, b"w:val")
                .and_then(|v| v.parse::<f32>().ok())
                .map(|half| half / 2.0);
            true
        }
        // The complex-script size is regenerated alongside w:sz on write
        b"szCs" => true,
        b"b" => {
            props.bold = Some(attr_bool(e, b"w:val").unwrap_or(true));
            true
        }
        b"i" => {
            props.italic = Some(attr_bool(e, b"w:val").unwrap_or(true));
            true
        }
        b"u" => {
            let val = get_attr(e, b"w:val");
            props.underline = Some(val.as_deref() != Some("none"));
            true
        }
        b"color" => {
            props.color = get_attr(e, b"w:val");
            true
        }
        _ => false,
    }
}

/// sectPr children that are ordered before pgMar in CT_SectPr
const SECT_BEFORE_PGMAR: &[&[u8]] = &[b"footnotePr", b"endnotePr", b"type", b"pgSz"];

/// Parse section properties from a verbatim sectPr element
pub(crate) fn parse_section(raw: &str) -> Result<SectionProps> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(false);

    let mut sect = SectionProps::default();
    let mut depth = 0usize;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 0 && e.local_name().as_ref() == b"sectPr" {
                    depth = 1;
                    continue;
                }
                if !apply_sect_child(&e, &mut sect, true) {
                    let owned = capture_element(&mut reader, raw, pos, &e)?;
                    push_sect_extra(&mut sect, e.local_name().as_ref(), owned);
                } else {
                    let end_name = e.to_end().into_owned();
                    reader.read_to_end(end_name.name())?;
                }
            }
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"sectPr" {
                    break;
                }
                if !apply_sect_child(&e, &mut sect, false) {
                    let owned = capture_empty(&reader, raw, pos);
                    push_sect_extra(&mut sect, e.local_name().as_ref(), owned);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"sectPr" => break,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sect)
}

fn push_sect_extra(sect: &mut SectionProps, name: &[u8], raw: String) {
    if SECT_BEFORE_PGMAR.contains(&name) {
        sect.extra_before.push_str(&raw);
    } else {
        sect.extra_after.push_str(&raw);
    }
}

fn apply_sect_child(e: &BytesStart, sect: &mut SectionProps, _is_start: bool) -> bool {
    match e.local_name().as_ref() {
        b"headerReference" | b"footerReference" => {
            let kind = get_attr(e, b"w:type")
                .map(|v| HfKind::from_val(&v))
                .unwrap_or(HfKind::Default);
            let rel_id = get_attr_local(e, b"id").unwrap_or_default();
            let hf = HfRef { kind, rel_id };
            if e.local_name().as_ref() == b"headerReference" {
                sect.header_refs.push(hf);
            } else {
                sect.footer_refs.push(hf);
            }
            true
        }
        b"pgMar" => {
            sect.margin_top_pt = attr_twips_pt(e, b"w:top");
            sect.margin_bottom_pt = attr_twips_pt(e, b"w:bottom");
            sect.margin_left_pt = attr_twips_pt(e, b"w:left");
            sect.margin_right_pt = attr_twips_pt(e, b"w:right");
            sect.header_distance_pt = attr_twips_pt(e, b"w:header");
            sect.footer_distance_pt = attr_twips_pt(e, b"w:footer");
            sect.gutter_pt = attr_twips_pt(e, b"w:gutter");
            true
        }
        _ => false,
    }
}

// Attribute helpers

fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| String::from_utf8(a.value.to_vec()).ok())
}

/// Match an attribute by its local name regardless of namespace prefix
/// (e.g. r:id)
fn get_attr_local(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| {
            let key = a.key.as_ref();
            key == local || key.split(|&b| b == b':').nth(1) == Some(local)
        })
        .and_then(|a| String::from_utf8(a.value.to_vec()).ok())
}

fn attr_i32(e: &BytesStart, name: &[u8]) -> Option<i32> {
    get_attr(e, name).and_then(|v| v.parse().ok())
}

fn attr_twips_pt(e: &BytesStart, name: &[u8]) -> Option<f32> {
    get_attr(e, name)
        .and_then(|v| v.parse::<f32>().ok())
        .map(|twips| twips / 20.0)
}

fn attr_bool(e: &BytesStart, name: &[u8]) -> Option<bool> {
    get_attr(e, name).map(|v| !(v == "0" || v == "false" || v == "off"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn doc(body: &str) -> Document {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document {NS}><w:body>{body}</w:body></w:document>"#
        );
        Document::parse(&xml).unwrap()
    }

    #[test]
    fn parse_simple_paragraph() {
        let d = doc("<w:p><w:r><w:t>Hello, world!</w:t></w:r></w:p>");
        assert_eq!(d.blocks.len(), 1);
        let p = d.blocks[0].as_paragraph().unwrap();
        assert_eq!(p.text(), "Hello, world!");
        assert_eq!(p.alignment, Alignment::Unset);
    }

    #[test]
    fn parse_alignment_and_fonts() {
        let d = doc(concat!(
            r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:rFonts w:ascii="Times New Roman" w:eastAsia="黑体"/>"#,
            r#"<w:sz w:val="32"/><w:b/></w:rPr><w:t>标题</w:t></w:r></w:p>"#,
        ));
        let p = d.blocks[0].as_paragraph().unwrap();
        assert_eq!(p.alignment, Alignment::Center);
        let run = p.runs().next().unwrap();
        assert_eq!(run.props.font.as_deref(), Some("黑体"));
        assert_eq!(run.props.size_pt, Some(16.0));
        assert_eq!(run.props.bold, Some(true));
    }

    #[test]
    fn table_is_opaque() {
        let tbl = r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;
        let d = doc(&format!("<w:p/>{tbl}"));
        assert_eq!(d.blocks.len(), 2);
        match &d.blocks[1] {
            Block::Table(t) => assert_eq!(t.xml, tbl),
            Block::Paragraph(_) => panic!("expected table"),
        }
    }

    #[test]
    fn drawing_run_kept_raw() {
        let run = r#"<w:r><w:drawing><wp:inline/></w:drawing></w:r>"#;
        let d = doc(&format!("<w:p>{run}</w:p>"));
        let p = d.blocks[0].as_paragraph().unwrap();
        assert!(p.has_raw_marker("<w:drawing"));
        assert!(p.is_blank());
        assert_eq!(p.children, vec![ParagraphChild::Raw(run.to_string())]);
    }

    #[test]
    fn indent_and_spacing_parsed() {
        let d = doc(concat!(
            r#"<w:p><w:pPr><w:ind w:firstLine="420" w:left="200"/>"#,
            r#"<w:spacing w:before="100" w:line="560" w:lineRule="exact"/>"#,
            r#"<w:outlineLvl w:val="1"/></w:pPr></w:p>"#,
        ));
        let p = d.blocks[0].as_paragraph().unwrap();
        assert_eq!(p.format.first_line_pt, Some(21.0));
        assert_eq!(p.format.left_indent_pt, Some(10.0));
        assert_eq!(p.format.space_before_pt, Some(5.0));
        assert_eq!(p.format.line_twips, Some(560));
        assert_eq!(p.format.line_rule.as_deref(), Some("exact"));
        assert_eq!(p.format.outline_level, Some(1));
    }

    #[test]
    fn unknown_ppr_kept_verbatim() {
        let d = doc(r#"<w:p><w:pPr><w:shd w:val="clear" w:fill="FFFF00"/></w:pPr></w:p>"#);
        let p = d.blocks[0].as_paragraph().unwrap();
        assert_eq!(p.extra_ppr, r#"<w:shd w:val="clear" w:fill="FFFF00"/>"#);
    }

    #[test]
    fn body_section_parsed() {
        let d = doc(concat!(
            r#"<w:p/><w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
            r#"<w:pgMar w:top="2098" w:bottom="1984" w:left="1588" w:right="1474" w:header="851" w:footer="1418" w:gutter="0"/>"#,
            r#"<w:cols w:space="425"/></w:sectPr>"#,
        ));
        let sect = d.body_section.unwrap();
        assert_eq!(sect.margin_top_pt, Some(104.9));
        assert_eq!(sect.footer_distance_pt, Some(70.9));
        assert!(sect.extra_before.contains("pgSz"));
        assert!(sect.extra_after.contains("cols"));
    }

    #[test]
    fn strip_leading_whitespace_removes_blank_runs() {
        let mut p = Paragraph::default();
        p.children.push(ParagraphChild::Run(Run::new("   ")));
        p.children.push(ParagraphChild::Run(Run::new("  正文开始")));
        p.strip_leading_whitespace();
        assert_eq!(p.text(), "正文开始");
        assert_eq!(p.runs().count(), 1);
    }

    #[test]
    fn break_and_tab_become_text() {
        let d = doc("<w:p><w:r><w:t>a</w:t><w:br/><w:t>b</w:t><w:tab/></w:r></w:p>");
        let p = d.blocks[0].as_paragraph().unwrap();
        assert_eq!(p.text(), "a\nb\t");
    }

    #[test]
    fn leading_whitespace_counts_chars() {
        let mut p = Paragraph::default();
        p.children
            .push(ParagraphChild::Run(Run::new("\u{3000}\u{3000}缩进")));
        assert_eq!(p.leading_whitespace_len(), 2);
    }
}
