//! Package opening and document model construction.

mod builder;
mod numbering;
mod package;
mod tracker;
mod wml;

pub mod options;

pub use numbering::{ListNumbering, MarkerKind, PatternCascade, TextMarker};
pub use options::{ErrorMode, ParseOptions};
pub use package::DocxPackage;
pub use tracker::SectionTracker;

use crate::error::Result;
use crate::model::DocumentModel;

/// Build the document model from an opened package.
pub fn parse_package(package: &DocxPackage, options: &ParseOptions) -> Result<DocumentModel> {
    builder::build_model(package, options)
}
