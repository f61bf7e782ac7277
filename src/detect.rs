//! Container format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// OOXML word-document container information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Name of the main document part inside the package
    pub main_part: String,
    /// Whether the package carries core properties (docProps/core.xml)
    pub has_core_properties: bool,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OOXML word document ({})", self.main_part)
    }
}

/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// The main document part every word package must carry.
pub(crate) const MAIN_PART: &str = "word/document.xml";

/// The core-properties part (optional in practice).
pub(crate) const CORE_PART: &str = "docProps/core.xml";

/// Detect the container format from a file path.
///
/// # Returns
/// * `Ok(DocxFormat)` if the file is a word-document package
/// * `Err(Error::UnknownFormat)` otherwise
///
/// # Example
/// ```no_run
/// use redocx::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("contract.docx").unwrap();
/// println!("main part: {}", format.main_part);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    detect_format_from_bytes(&data)
}

/// Detect the container format from bytes.
///
/// Checks the ZIP magic, then confirms the package holds a main
/// document part. An empty or spanned archive header is rejected.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if data.len() < ZIP_MAGIC.len() || !data.starts_with(ZIP_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor).map_err(|_| Error::UnknownFormat)?;

    let mut main_part = None;
    let mut has_core_properties = false;
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|_| Error::UnknownFormat)?;
        match entry.name() {
            MAIN_PART => main_part = Some(MAIN_PART.to_string()),
            CORE_PART => has_core_properties = true,
            _ => {}
        }
    }

    match main_part {
        Some(main_part) => Ok(DocxFormat {
            main_part,
            has_core_properties,
        }),
        None => Err(Error::UnknownFormat),
    }
}

/// Check if a file is a word-document package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes represent a word-document package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
