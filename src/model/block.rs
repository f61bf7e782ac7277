//! Block and paragraph-level types.

use super::{SectionNode, Table};
use serde::{Deserialize, Serialize};

/// A content block in the document's original top-to-bottom order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),
}

impl Block {
    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }
}

/// A paragraph with its structural stamps.
///
/// Ids are stable, sequential and 1-based; table-cell paragraphs draw
/// from the same global sequence as top-level paragraphs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    /// Stable paragraph id, assigned once at parse time
    pub id: u32,

    /// Trimmed paragraph text
    pub text: String,

    /// Explicit numbering label found in the text (e.g. `"Section 5.3"`),
    /// if any. Auto-generated list labels appear only in the hierarchy.
    pub marker: Option<String>,

    /// Flattened reference of the hierarchy active at this paragraph,
    /// e.g. `"7A(ii)"`. `None` for paragraphs before the first section
    /// or whose style data was malformed.
    pub section_ref: Option<String>,

    /// Caption extracted from the text after the numbering label
    pub caption: Option<String>,

    /// Style descriptor from the container
    pub style: StyleInfo,

    /// Ancestor chain active at this paragraph (level 0 = outermost)
    pub section_hierarchy: Vec<SectionNode>,
}

impl Paragraph {
    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Check if this paragraph is styled as a heading.
    pub fn is_heading(&self) -> bool {
        self.style.is_heading
    }
}

/// Paragraph style descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleInfo {
    /// Style name (resolved from the style catalog, or the raw style id)
    pub name: String,

    /// Whether the style is a heading style
    pub is_heading: bool,

    /// Numbering-list reference, if the paragraph is auto-numbered
    pub numbering: Option<NumberingRef>,
}

/// Reference into a numbering-list definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRef {
    /// Numbering definition id (`w:numId`)
    pub num_id: String,

    /// Indent level within the list (`w:ilvl`, 0 = top)
    pub level: u8,
}
