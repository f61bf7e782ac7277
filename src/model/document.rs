//! Document-level types.

use super::{Block, Paragraph, SectionNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The paragraph-addressable model of a parsed document.
///
/// Built once per source container and immutable afterward. A revision
/// pass reads it but produces a new output container; neither the model
/// nor the original container is mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Document metadata (core properties)
    pub metadata: Metadata,

    /// Blocks in original document order
    pub content: Vec<Block>,

    /// Top-level section index
    pub sections: Vec<SectionEntry>,

    /// Defined terms, sorted and unique by exact term text
    pub defined_terms: Vec<DefinedTerm>,

    /// Exhibit headers
    pub exhibits: Vec<Exhibit>,
}

impl DocumentModel {
    /// Find a paragraph by id, descending into table cells.
    pub fn paragraph(&self, id: u32) -> Option<&Paragraph> {
        self.paragraphs().find(|p| p.id == id)
    }

    /// Check whether an id was issued by this model.
    pub fn contains_id(&self, id: u32) -> bool {
        self.paragraph(id).is_some()
    }

    /// Iterate every paragraph in id order, table cells included.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().flat_map(|block| match block {
            Block::Paragraph(p) => ParagraphIter::One(std::iter::once(p)),
            Block::Table(t) => ParagraphIter::Table(Box::new(t.paragraphs())),
        })
    }

    /// Total number of addressed paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Check if the document has any content blocks.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                Block::Paragraph(p) => p.text.clone(),
                Block::Table(t) => t.plain_text(),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

enum ParagraphIter<'a> {
    One(std::iter::Once<&'a Paragraph>),
    Table(Box<dyn Iterator<Item = &'a Paragraph> + 'a>),
}

impl<'a> Iterator for ParagraphIter<'a> {
    type Item = &'a Paragraph;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            ParagraphIter::One(it) => it.next(),
            ParagraphIter::Table(it) => it.next(),
        }
    }
}

/// Document metadata from the package core properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

/// An entry in the top-level section index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionEntry {
    /// Id of the paragraph that opens the section
    pub paragraph_id: u32,

    /// Explicit numbering label, if the text carried one
    pub label: Option<String>,

    /// Section title (caption, or a text prefix)
    pub title: String,

    /// Hierarchy active at the section opener
    pub hierarchy: Vec<SectionNode>,
}

/// A formally defined term; first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinedTerm {
    /// Exact term text as quoted in the document
    pub term: String,

    /// Paragraph id of the first occurrence
    pub first_paragraph: u32,

    /// Section reference active at the first occurrence
    pub section_ref: Option<String>,
}

/// An exhibit header block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exhibit {
    /// Id of the paragraph carrying the header
    pub paragraph_id: u32,

    /// Header text, e.g. `"EXHIBIT A"`
    pub title: String,
}
