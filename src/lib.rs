//! # redocx
//!
//! Contract document structural model and redline round-trip for OOXML
//! word documents.
//!
//! The library parses a word-document container into a
//! paragraph-addressable model (section hierarchy, defined terms,
//! tables), accepts per-paragraph text revisions keyed to the model's
//! ids, and rebuilds the original container in two modes: a clean final
//! version and a tracked-changes version with author attribution.
//!
//! ## Quick Start
//!
//! ```no_run
//! use redocx::{parse_file, render, revise};
//!
//! fn main() -> redocx::Result<()> {
//!     // Parse a contract
//!     let model = parse_file("contract.docx")?;
//!     println!("{}", render::to_json(&model, render::JsonFormat::Pretty)?);
//!
//!     // Apply an accepted revision and rebuild both outputs
//!     let revisions: revise::RevisionSet = [revise::Revision::accepted(
//!         12,
//!         "The Closing shall occur promptly.",
//!         "The Closing shall occur no later than 30 days.",
//!     )]
//!     .into_iter()
//!     .collect();
//!
//!     let options = revise::ReviseOptions::new().with_author("Reviewer");
//!     revise::generate_documents(
//!         "contract.docx",
//!         &revisions,
//!         "contract_clean.docx",
//!         "contract_tracked.docx",
//!         &options,
//!     )?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Section reconstruction**: explicit text markers, list-style
//!   auto-numbering, and heading styles resolved into one hierarchy
//! - **Stable addressing**: 1-based paragraph ids shared between
//!   top-level and table-cell paragraphs
//! - **Format-preserving rebuilds**: untouched paragraphs pass through
//!   byte-for-byte; revised ones keep their first run's formatting
//! - **Attributed redlines**: insertion/deletion markup with author and
//!   timestamp, falling back to clean replacement only with notice

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod revise;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, DocxFormat};
pub use error::{Error, Result};
pub use model::{
    Block, DefinedTerm, DocumentModel, Exhibit, Metadata, Paragraph, SectionEntry, SectionNode,
    StyleInfo, Table, TableCell, TableRow,
};
pub use parser::{DocxPackage, ErrorMode, ParseOptions};
pub use render::JsonFormat;
pub use revise::{
    Fidelity, RebuildReport, ReviseOptions, Revision, RevisionSet,
};

use std::io::Read;
use std::path::Path;

/// Parse a word-document file and return the structural model.
///
/// # Example
///
/// ```no_run
/// use redocx::parse_file;
///
/// let model = parse_file("contract.docx").unwrap();
/// println!("paragraphs: {}", model.paragraph_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<DocumentModel> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Parse a word-document file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<DocumentModel> {
    let package = DocxPackage::open(path)?;
    parser::parse_package(&package, &options)
}

/// Parse a word document from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<DocumentModel> {
    parse_bytes_with_options(data, ParseOptions::default())
}

/// Parse a word document from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<DocumentModel> {
    let package = DocxPackage::from_bytes(data)?;
    parser::parse_package(&package, &options)
}

/// Parse a word document from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<DocumentModel> {
    let package = DocxPackage::from_reader(reader)?;
    parser::parse_package(&package, &ParseOptions::default())
}

/// Extract plain text from a word-document file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let model = parse_file(path)?;
    Ok(model.plain_text())
}

/// Builder for parsing and reviewing word documents.
///
/// # Example
///
/// ```no_run
/// use redocx::Redocx;
///
/// let json = Redocx::new()
///     .strict()
///     .parse("contract.docx")?
///     .to_json(redocx::JsonFormat::Compact)?;
/// # Ok::<(), redocx::Error>(())
/// ```
pub struct Redocx {
    parse_options: ParseOptions,
}

impl Redocx {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
        }
    }

    /// Fail the parse on the first malformed paragraph.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Degrade gracefully on malformed paragraphs (the default).
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Disable defined-term extraction.
    pub fn without_terms(mut self) -> Self {
        self.parse_options = self.parse_options.with_terms(false);
        self
    }

    /// Set the caption length limit.
    pub fn with_caption_limit(mut self, limit: usize) -> Self {
        self.parse_options = self.parse_options.with_caption_limit(limit);
        self
    }

    /// Parse a file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<RedocxResult> {
        let package = DocxPackage::open(path)?;
        let model = parser::parse_package(&package, &self.parse_options)?;
        Ok(RedocxResult { model, package })
    }

    /// Parse bytes and return a result wrapper.
    pub fn parse_bytes(self, data: &[u8]) -> Result<RedocxResult> {
        let package = DocxPackage::from_bytes(data)?;
        let model = parser::parse_package(&package, &self.parse_options)?;
        Ok(RedocxResult { model, package })
    }
}

impl Default for Redocx {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a word document: the model plus the opened package,
/// ready for a rebuild pass.
pub struct RedocxResult {
    /// The structural model
    pub model: DocumentModel,
    package: DocxPackage,
}

impl RedocxResult {
    /// Serialize the model to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.model, format)
    }

    /// Get plain text content.
    pub fn plain_text(&self) -> String {
        self.model.plain_text()
    }

    /// Get the model.
    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    /// Get the opened package.
    pub fn package(&self) -> &DocxPackage {
        &self.package
    }

    /// Rebuild the package cleanly with the given revisions.
    pub fn rebuild_clean(&self, revisions: &RevisionSet) -> Result<(Vec<u8>, RebuildReport)> {
        revise::rebuild_clean_bytes(&self.package.to_bytes()?, revisions)
    }

    /// Rebuild the package with tracked changes.
    pub fn rebuild_tracked(
        &self,
        revisions: &RevisionSet,
        options: &ReviseOptions,
    ) -> Result<(Vec<u8>, RebuildReport)> {
        revise::rebuild_tracked_bytes(&self.package.to_bytes()?, revisions, options)
    }
}
