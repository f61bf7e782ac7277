//! Error types for the redocx library.

use std::io;
use thiserror::Error;

/// Result type alias for redocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while parsing or rebuilding a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not recognized as an OOXML word document.
    #[error("Unknown file format: not an OOXML word document")]
    UnknownFormat,

    /// The container is a ZIP archive but a required part is absent.
    #[error("Missing required package part: {0}")]
    MissingPart(String),

    /// Error reading or writing the OPC (ZIP) container.
    #[error("Package error: {0}")]
    Package(String),

    /// Error parsing WordprocessingML content.
    #[error("XML error: {0}")]
    Xml(String),

    /// A part could not be decoded as UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A paragraph carries unparseable style or numbering data.
    ///
    /// Only raised under [`ErrorMode::Strict`](crate::parser::ErrorMode);
    /// lenient parsing records the paragraph without a section reference.
    #[error("Malformed paragraph {id}: {detail}")]
    MalformedParagraph {
        /// Paragraph id at the point of failure
        id: u32,
        /// What was wrong with it
        detail: String,
    },

    /// Error rebuilding the output container.
    #[error("Rebuild error: {0}")]
    Rebuild(String),

    /// Error rendering model output (JSON, manifest).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => {
                Error::MissingPart("file not found in archive".to_string())
            }
            _ => Error::Package(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}
