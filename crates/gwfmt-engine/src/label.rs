//! Structural labels assigned to document blocks

/// The structural role of one block, decided exactly once per pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Title,
    Subtitle,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Body,
    FigureCaption,
    TableCaption,
    AttachmentMarker,
    AttachmentTitle,
    AttachmentSubtitle,
    /// A table block, carried through untouched
    SkippedTable,
    /// A paragraph with no visible text, carried through untouched
    SkippedBlank,
}
