//! Rendering module for boundary outputs: the serialized model and the
//! change manifest.

mod json;
mod manifest;

pub use json::{to_json, JsonFormat};
pub use manifest::{to_manifest, ManifestOptions};
