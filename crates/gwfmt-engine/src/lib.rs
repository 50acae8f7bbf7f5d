//! Structure classification and house-style formatting for official
//! office documents
//!
//! The engine takes a draft (.docx or plain text, optionally .doc/.wps
//! through a pluggable converter), recovers its structure — title block,
//! heading tiers, captions, attachment sections — from typography and
//! numbering patterns alone, and rewrites it in the standard house style:
//! configured fonts per structural role, exact line spacing, standard
//! indentation, page geometry, and a PAGE-field footer.
//!
//! Entry points: [`Formatter::format_file`] for one document,
//! [`format_batch`] for many, [`StyleConfig`] for the style knobs.

pub mod classify;
pub mod config;
pub mod error;
pub mod label;
pub mod locate;
pub mod page;
pub mod patterns;
pub mod pipeline;
pub mod style;

pub use classify::Classifier;
pub use config::{FontSpec, PageNumberAlign, PageSetup, StyleConfig};
pub use error::{FormatError, Result};
pub use label::Label;
pub use locate::{find_title_and_subtitle, TitleSpans};
pub use pipeline::{format_batch, BatchSummary, Formatter, LegacyConverter, Preprocessor};
