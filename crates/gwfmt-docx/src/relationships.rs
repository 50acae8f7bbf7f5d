//! Relationship part handling (word/_rels/document.xml.rels)
//!
//! Footer parts must be wired up through the document's relationship file
//! before a footerReference in sectPr can resolve. This keeps the existing
//! entries untouched and appends new ones with fresh rIds.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::writer::escape_xml;

/// OOXML package relationships namespace
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Parsed relationships, serialized back in insertion order
#[derive(Debug, Clone)]
pub struct Relationships {
    order: Vec<String>,
    map: HashMap<String, RelationshipTarget>,
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
            // IDs start at rId1
            next_id_counter: 1,
        }
    }
}

/// One relationship entry
#[derive(Debug, Clone)]
pub struct RelationshipTarget {
    pub target: String,
    pub rel_type: String,
    pub target_mode: Option<String>,
}

impl Relationships {
    /// Footer relationship type
    pub const TYPE_FOOTER: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    /// Settings relationship type
    pub const TYPE_SETTINGS: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";

    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a .rels file
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::default();
        let mut max_id: u32 = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;
                    let mut target_mode = None;
                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let value = attr.unescape_value().ok().map(|s| s.to_string());
                        match attr.key.as_ref() {
                            b"Id" => id = value,
                            b"Target" => target = value,
                            b"Type" => rel_type = value,
                            b"TargetMode" => target_mode = value,
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target)) = (id, target) {
                        if let Some(num) = extract_id_number(&id) {
                            max_id = max_id.max(num);
                        }
                        rels.order.push(id.clone());
                        rels.map.insert(
                            id,
                            RelationshipTarget {
                                target,
                                rel_type: rel_type.unwrap_or_default(),
                                target_mode,
                            },
                        );
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        rels.next_id_counter = max_id + 1;
        Ok(rels)
    }

    /// Add a relationship and return the generated ID (e.g. "rId7")
    pub fn add(&mut self, target: String, rel_type: String) -> String {
        let id = format!("rId{}", self.next_id_counter);
        self.next_id_counter += 1;
        self.order.push(id.clone());
        self.map.insert(
            id.clone(),
            RelationshipTarget {
                target,
                rel_type,
                target_mode: None,
            },
        );
        id
    }

    /// First relationship ID of the given type, if any
    pub fn find_by_type(&self, rel_type: &str) -> Option<&str> {
        self.order
            .iter()
            .find(|id| {
                self.map
                    .get(id.as_str())
                    .is_some_and(|rel| rel.rel_type == rel_type)
            })
            .map(|id| id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&RelationshipTarget> {
        self.map.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Serialize in insertion order for deterministic output
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{RELATIONSHIPS_NS}">"#));
        xml.push('\n');
        for id in &self.order {
            if let Some(rel) = self.map.get(id) {
                xml.push_str("  <Relationship");
                xml.push_str(&format!(r#" Id="{}""#, escape_xml(id)));
                xml.push_str(&format!(r#" Type="{}""#, escape_xml(&rel.rel_type)));
                xml.push_str(&format!(r#" Target="{}""#, escape_xml(&rel.target)));
                if let Some(mode) = &rel.target_mode {
                    xml.push_str(&format!(r#" TargetMode="{}""#, escape_xml(mode)));
                }
                xml.push_str("/>\n");
            }
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Numeric part of an rId ("rId5" -> 5)
fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId").and_then(|n| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        r#"<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>"#,
        r#"</Relationships>"#,
    );

    #[test]
    fn parse_and_continue_numbering() {
        let mut rels = Relationships::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rels.len(), 2);
        let id = rels.add(
            "footer1.xml".to_string(),
            Relationships::TYPE_FOOTER.to_string(),
        );
        assert_eq!(id, "rId4");
        assert!(rels.contains("rId4"));
    }

    #[test]
    fn find_by_type_matches_settings() {
        let rels = Relationships::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rels.find_by_type(Relationships::TYPE_SETTINGS), Some("rId3"));
        assert_eq!(rels.find_by_type(Relationships::TYPE_FOOTER), None);
    }

    #[test]
    fn round_trip_preserves_order() {
        let rels = Relationships::parse(SAMPLE.as_bytes()).unwrap();
        let xml = rels.to_xml();
        let first = xml.find("rId1").unwrap();
        let second = xml.find("rId3").unwrap();
        assert!(first < second);
        assert!(xml.contains(r#"Target="styles.xml""#));
    }

    #[test]
    fn empty_rels_serialize() {
        let rels = Relationships::new();
        assert!(rels.is_empty());
        assert!(rels.to_xml().contains("<Relationships"));
    }
}
