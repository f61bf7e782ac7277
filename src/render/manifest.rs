//! Markdown change manifest.
//!
//! A plain-text record of every applied revision, for transmittal
//! alongside the rebuilt documents. Rationales are pass-through data
//! supplied by the caller, never derived here.

use chrono::{DateTime, Utc};

use crate::model::DocumentModel;
use crate::revise::RebuildReport;

/// Options for manifest generation.
#[derive(Debug, Clone, Default)]
pub struct ManifestOptions {
    /// Free-form reviewer context shown in the header
    pub context: Option<String>,

    /// Fixed generation timestamp; `None` uses the current time
    pub generated: Option<DateTime<Utc>>,
}

impl ManifestOptions {
    /// Create new manifest options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reviewer context line.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Pin the generation timestamp.
    pub fn with_generated(mut self, generated: DateTime<Utc>) -> Self {
        self.generated = Some(generated);
        self
    }
}

const PREVIEW_LIMIT: usize = 200;

/// Render the change manifest for a rebuild.
///
/// When a model is supplied, each entry carries the section reference
/// active at its paragraph.
pub fn to_manifest(
    report: &RebuildReport,
    model: Option<&DocumentModel>,
    options: &ManifestOptions,
) -> String {
    let generated = options.generated.unwrap_or_else(Utc::now);
    let mut lines = vec![
        "# Redline Manifest".to_string(),
        String::new(),
        format!("**Generated:** {}", generated.format("%Y-%m-%d %H:%M:%S")),
    ];

    if let Some(context) = &options.context {
        lines.push(format!("**Context:** {}", context));
    }

    lines.extend([
        String::new(),
        "---".to_string(),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("Total revisions applied: {}", report.changes),
        String::new(),
        "---".to_string(),
        String::new(),
        "## Changes".to_string(),
        String::new(),
    ]);

    for applied in &report.applied {
        let section_ref = model
            .and_then(|m| m.paragraph(applied.paragraph_id))
            .and_then(|p| p.section_ref.clone());
        let heading = match section_ref {
            Some(section_ref) => {
                format!("### Paragraph {} (§{})", applied.paragraph_id, section_ref)
            }
            None => format!("### Paragraph {}", applied.paragraph_id),
        };

        lines.extend([
            heading,
            String::new(),
            "**Original:**".to_string(),
            format!("> {}", preview(&applied.original)),
            String::new(),
            "**Revised:**".to_string(),
            format!("> {}", preview(&applied.revised)),
            String::new(),
            format!(
                "**Rationale:** {}",
                applied.rationale.as_deref().unwrap_or("N/A")
            ),
            String::new(),
            "---".to_string(),
            String::new(),
        ]);
    }

    lines.join("\n")
}

/// Truncate text to the preview limit on a character boundary.
fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LIMIT {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(PREVIEW_LIMIT).collect();
        format!("{}...", prefix)
    }
}
