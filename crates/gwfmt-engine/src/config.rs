//! Style configuration
//!
//! Every knob of the house style lives here: fonts per structural role,
//! page geometry, spacing, and feature switches. The defaults reproduce
//! the conventional party-and-government document style (GB/T 9704
//! derived): 方正小标宋 titles, 黑体/楷体/仿宋 heading tiers, 28pt exact
//! line spacing, and the standard page margins.
//!
//! Configurations round-trip through JSON; a partial file overrides only
//! the fields it names.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A font family with its size in points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub name: String,
    pub size_pt: f32,
}

impl FontSpec {
    pub fn new(name: &str, size_pt: f32) -> Self {
        Self {
            name: name.to_string(),
            size_pt,
        }
    }
}

/// Page number placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageNumberAlign {
    /// Centered on every page
    Center,
    /// Outer edge: right on odd pages, left on even pages
    #[default]
    OddEven,
}

/// Page geometry in centimeters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub margin_top_cm: f32,
    pub margin_bottom_cm: f32,
    pub margin_left_cm: f32,
    pub margin_right_cm: f32,
    pub footer_distance_cm: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            margin_top_cm: 3.7,
            margin_bottom_cm: 3.5,
            margin_left_cm: 2.8,
            margin_right_cm: 2.6,
            footer_distance_cm: 2.5,
        }
    }
}

/// The complete house style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub title_font: FontSpec,
    pub subtitle_font: FontSpec,
    pub heading1_font: FontSpec,
    pub heading2_font: FontSpec,
    pub body_font: FontSpec,
    pub figure_caption_font: FontSpec,
    pub table_caption_font: FontSpec,
    pub attachment_font: FontSpec,
    pub page_number_font: FontSpec,

    pub page: PageSetup,

    /// Exact line spacing for body and headings, points
    pub line_spacing_pt: f32,
    /// Exact line spacing for the title block, points
    pub title_line_spacing_pt: f32,
    pub subtitle_line_spacing_pt: f32,
    pub left_indent_cm: f32,
    pub right_indent_cm: f32,

    /// Assign outline levels to headings for the navigation pane
    pub set_outline: bool,
    /// Detect attachment markers and reformat attachment sections
    pub enable_attachment_formatting: bool,
    pub page_number_align: PageNumberAlign,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            title_font: FontSpec::new("方正小标宋简体", 22.0),
            subtitle_font: FontSpec::new("楷体_GB2312", 16.0),
            heading1_font: FontSpec::new("黑体", 16.0),
            heading2_font: FontSpec::new("楷体_GB2312", 16.0),
            body_font: FontSpec::new("仿宋_GB2312", 16.0),
            figure_caption_font: FontSpec::new("黑体", 14.0),
            table_caption_font: FontSpec::new("黑体", 14.0),
            attachment_font: FontSpec::new("黑体", 16.0),
            page_number_font: FontSpec::new("宋体", 14.0),
            page: PageSetup::default(),
            line_spacing_pt: 28.0,
            title_line_spacing_pt: 33.0,
            subtitle_line_spacing_pt: 33.0,
            left_indent_cm: 0.0,
            right_indent_cm: 0.0,
            set_outline: true,
            enable_attachment_formatting: true,
            page_number_align: PageNumberAlign::default(),
        }
    }
}

impl StyleConfig {
    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_house_style() {
        let config = StyleConfig::default();
        assert_eq!(config.title_font.name, "方正小标宋简体");
        assert_eq!(config.title_font.size_pt, 22.0);
        assert_eq!(config.body_font.name, "仿宋_GB2312");
        assert_eq!(config.line_spacing_pt, 28.0);
        assert_eq!(config.page.margin_top_cm, 3.7);
        assert_eq!(config.page_number_align, PageNumberAlign::OddEven);
        assert!(config.set_outline);
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let json = r#"{"line_spacing_pt": 30.0, "page_number_align": "center"}"#;
        let config: StyleConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.line_spacing_pt, 30.0);
        assert_eq!(config.page_number_align, PageNumberAlign::Center);
        assert_eq!(config.title_font.size_pt, 22.0);
    }

    #[test]
    fn json_round_trip() {
        let config = StyleConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: StyleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.json");
        let mut config = StyleConfig::default();
        config.enable_attachment_formatting = false;
        config.save(&path).unwrap();
        let loaded = StyleConfig::load(&path).unwrap();
        assert!(!loaded.enable_attachment_formatting);
        assert_eq!(loaded, config);
    }
}
