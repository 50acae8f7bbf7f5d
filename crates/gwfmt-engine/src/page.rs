//! Page setup and footer construction
//!
//! Runs once per document after classification: applies the configured
//! margins and footer distance to every section, then installs the page
//! number footer. The page number is a live PAGE field flanked by em-dash
//! decorations, either centered, or mirrored to the outer edge with
//! odd/even footer differentiation.

use gwfmt_docx::archive::{CONTENT_TYPES_PATH, DOCUMENT_RELS_PATH, SETTINGS_PATH};
use gwfmt_docx::writer::{
    add_content_type_override, cm_to_pt, footer_part_xml, page_field_run_xml,
    set_even_odd_headers, FOOTER_CONTENT_TYPE, SETTINGS_CONTENT_TYPE,
};
use gwfmt_docx::{
    Alignment, Document, DocxArchive, HfKind, HfRef, Paragraph, ParagraphChild, Relationships, Run,
    RunProps, SectionProps,
};
use log::info;

use crate::config::{PageNumberAlign, StyleConfig};
use crate::error::Result;

/// Apply page geometry and build the page-number footers
pub fn finish(doc: &mut Document, archive: &mut DocxArchive, config: &StyleConfig) -> Result<()> {
    info!("applying page margins and footer setup");

    // Text-sourced documents start with no section trailer at all
    if doc.body_section.is_none() && doc.sections_mut().is_empty() {
        doc.body_section = Some(SectionProps::default());
    }

    let rels_xml = archive.get_string(DOCUMENT_RELS_PATH).unwrap_or_default();
    let mut rels = if rels_xml.is_empty() {
        Relationships::new()
    } else {
        Relationships::parse(rels_xml.as_bytes())?
    };

    let footer_refs = match config.page_number_align {
        PageNumberAlign::Center => {
            let part = write_footer_part(archive, &mut rels, config, Alignment::Center)?;
            vec![HfRef {
                kind: HfKind::Default,
                rel_id: part,
            }]
        }
        PageNumberAlign::OddEven => {
            let odd = write_footer_part(archive, &mut rels, config, Alignment::Right)?;
            let even = write_footer_part(archive, &mut rels, config, Alignment::Left)?;
            enable_even_odd_footers(archive, &mut rels)?;
            vec![
                HfRef {
                    kind: HfKind::Default,
                    rel_id: odd,
                },
                HfRef {
                    kind: HfKind::Even,
                    rel_id: even,
                },
            ]
        }
    };

    for sect in doc.sections_mut() {
        sect.margin_top_pt = Some(cm_to_pt(config.page.margin_top_cm));
        sect.margin_bottom_pt = Some(cm_to_pt(config.page.margin_bottom_cm));
        sect.margin_left_pt = Some(cm_to_pt(config.page.margin_left_cm));
        sect.margin_right_pt = Some(cm_to_pt(config.page.margin_right_cm));
        sect.footer_distance_pt = Some(cm_to_pt(config.page.footer_distance_cm));

        // Replace default/even footers; a first-page footer is left alone
        sect.footer_refs.retain(|hf| hf.kind == HfKind::First);
        sect.footer_refs.extend(footer_refs.iter().cloned());
    }

    archive.set_string(DOCUMENT_RELS_PATH, rels.to_xml());
    Ok(())
}

/// Create word/footerN.xml with the page number paragraph, register its
/// relationship and content type, and return the relationship ID
fn write_footer_part(
    archive: &mut DocxArchive,
    rels: &mut Relationships,
    config: &StyleConfig,
    alignment: Alignment,
) -> Result<String> {
    let mut n = 1;
    while archive.contains(&format!("word/footer{n}.xml")) {
        n += 1;
    }
    let name = format!("footer{n}.xml");
    let part_path = format!("word/{name}");

    let para = page_number_paragraph(config, alignment);
    archive.set_string(&part_path, footer_part_xml(&para));

    let content_types = archive.content_types_xml()?;
    archive.set_string(
        CONTENT_TYPES_PATH,
        add_content_type_override(&content_types, &format!("/{part_path}"), FOOTER_CONTENT_TYPE),
    );

    Ok(rels.add(name, Relationships::TYPE_FOOTER.to_string()))
}

/// The "— PAGE —" footer paragraph with the configured alignment
fn page_number_paragraph(config: &StyleConfig, alignment: Alignment) -> Paragraph {
    let props = RunProps {
        font: Some(config.page_number_font.name.clone()),
        size_pt: Some(config.page_number_font.size_pt),
        color: Some("000000".to_string()),
        ..Default::default()
    };

    let mut para = Paragraph {
        alignment,
        ..Default::default()
    };
    let dash = |text: &str| {
        let mut run = Run::new(text);
        run.props = props.clone();
        ParagraphChild::Run(run)
    };
    para.children.push(dash("— "));
    para.children.push(ParagraphChild::Raw(page_field_run_xml(&props)));
    para.children.push(dash(" —"));
    para
}

/// Odd/even footers only take effect once settings.xml says so
fn enable_even_odd_footers(archive: &mut DocxArchive, rels: &mut Relationships) -> Result<()> {
    let existing = archive.settings_xml();
    let had_settings = existing.is_some();
    archive.set_string(SETTINGS_PATH, set_even_odd_headers(existing.as_deref()));

    if !had_settings {
        let content_types = archive.content_types_xml()?;
        archive.set_string(
            CONTENT_TYPES_PATH,
            add_content_type_override(&content_types, "/word/settings.xml", SETTINGS_CONTENT_TYPE),
        );
        if rels.find_by_type(Relationships::TYPE_SETTINGS).is_none() {
            rels.add(
                "settings.xml".to_string(),
                Relationships::TYPE_SETTINGS.to_string(),
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_archive() -> DocxArchive {
        let doc = Document::default();
        DocxArchive::minimal(gwfmt_docx::writer::document_xml(&doc))
    }

    #[test]
    fn margins_applied_to_created_section() {
        let mut doc = Document::default();
        let mut archive = minimal_archive();
        finish(&mut doc, &mut archive, &StyleConfig::default()).unwrap();

        let sect = doc.body_section.as_ref().unwrap();
        // 3.7 cm top margin
        assert_eq!(sect.margin_top_pt, Some(cm_to_pt(3.7)));
        assert_eq!(sect.footer_distance_pt, Some(cm_to_pt(2.5)));
    }

    #[test]
    fn odd_even_mode_creates_two_footers_and_settings() {
        let mut doc = Document::default();
        let mut archive = minimal_archive();
        finish(&mut doc, &mut archive, &StyleConfig::default()).unwrap();

        assert!(archive.contains("word/footer1.xml"));
        assert!(archive.contains("word/footer2.xml"));
        let settings = archive.settings_xml().unwrap();
        assert!(settings.contains("<w:evenAndOddHeaders/>"));

        let sect = doc.body_section.as_ref().unwrap();
        assert_eq!(sect.footer_refs.len(), 2);
        assert_eq!(sect.footer_refs[0].kind, HfKind::Default);
        assert_eq!(sect.footer_refs[1].kind, HfKind::Even);

        // Odd pages right, even pages left
        let odd = archive.get_string("word/footer1.xml").unwrap();
        assert!(odd.contains(r#"<w:jc w:val="right"/>"#));
        let even = archive.get_string("word/footer2.xml").unwrap();
        assert!(even.contains(r#"<w:jc w:val="left"/>"#));
    }

    #[test]
    fn center_mode_single_footer() {
        let mut doc = Document::default();
        let mut archive = minimal_archive();
        let config = StyleConfig {
            page_number_align: PageNumberAlign::Center,
            ..Default::default()
        };
        finish(&mut doc, &mut archive, &config).unwrap();

        assert!(archive.contains("word/footer1.xml"));
        assert!(!archive.contains("word/footer2.xml"));
        let footer = archive.get_string("word/footer1.xml").unwrap();
        assert!(footer.contains(r#"<w:jc w:val="center"/>"#));
        assert!(footer.contains(r#"<w:instrText xml:space="preserve"> PAGE </w:instrText>"#));
        assert!(footer.contains("— "));
    }

    #[test]
    fn footer_relationships_registered() {
        let mut doc = Document::default();
        let mut archive = minimal_archive();
        finish(&mut doc, &mut archive, &StyleConfig::default()).unwrap();

        let rels_xml = archive.get_string(DOCUMENT_RELS_PATH).unwrap();
        let rels = Relationships::parse(rels_xml.as_bytes()).unwrap();
        assert_eq!(rels.find_by_type(Relationships::TYPE_FOOTER).is_some(), true);
        let content_types = archive.content_types_xml().unwrap();
        assert!(content_types.contains("/word/footer1.xml"));
        assert!(content_types.contains(FOOTER_CONTENT_TYPE));
    }

    #[test]
    fn existing_footer_refs_replaced() {
        let mut sect = SectionProps::default();
        sect.footer_refs.push(HfRef {
            kind: HfKind::Default,
            rel_id: "rId9".to_string(),
        });
        sect.footer_refs.push(HfRef {
            kind: HfKind::First,
            rel_id: "rId10".to_string(),
        });
        let mut doc = Document {
            blocks: Vec::new(),
            body_section: Some(sect),
        };
        let mut archive = minimal_archive();
        finish(&mut doc, &mut archive, &StyleConfig::default()).unwrap();

        let refs = &doc.body_section.as_ref().unwrap().footer_refs;
        assert!(refs.iter().all(|hf| hf.rel_id != "rId9"));
        assert!(refs.iter().any(|hf| hf.kind == HfKind::First && hf.rel_id == "rId10"));
    }
}
