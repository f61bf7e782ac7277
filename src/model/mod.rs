//! Document model types for contract content representation.
//!
//! This module defines the paragraph-addressable model built from a
//! word-document container. The model is immutable once built: revision
//! passes read it but always produce a new output container.

mod block;
mod document;
mod section;
mod table;

pub use block::{Block, NumberingRef, Paragraph, StyleInfo};
pub use document::{DefinedTerm, DocumentModel, Exhibit, Metadata, SectionEntry};
pub use section::SectionNode;
pub use table::{Table, TableCell, TableRow};
