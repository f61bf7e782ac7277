//! Revision records and rebuild reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A proposed text revision for one paragraph.
///
/// Paragraph ids are owned by the document model; a revision citing an
/// id the model never issued is ignored, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    /// Target paragraph id
    pub paragraph_id: u32,

    /// Original paragraph text as seen by the proposer
    pub original: String,

    /// Replacement text
    pub revised: String,

    /// Whether the reviewer accepted the revision
    pub accepted: bool,

    /// Caller-supplied rationale, passed through to the manifest
    pub rationale: Option<String>,
}

impl Revision {
    /// Create an accepted revision.
    pub fn accepted(
        paragraph_id: u32,
        original: impl Into<String>,
        revised: impl Into<String>,
    ) -> Self {
        Self {
            paragraph_id,
            original: original.into(),
            revised: revised.into(),
            accepted: true,
            rationale: None,
        }
    }

    /// Create a rejected (inactive) revision.
    pub fn rejected(
        paragraph_id: u32,
        original: impl Into<String>,
        revised: impl Into<String>,
    ) -> Self {
        Self {
            accepted: false,
            ..Self::accepted(paragraph_id, original, revised)
        }
    }

    /// Attach a rationale.
    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }
}

/// A set of revisions keyed by paragraph id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevisionSet {
    revisions: BTreeMap<u32, Revision>,
}

impl RevisionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a revision, replacing any prior one for the same paragraph.
    pub fn insert(&mut self, revision: Revision) {
        self.revisions.insert(revision.paragraph_id, revision);
    }

    /// Look up a revision by paragraph id.
    pub fn get(&self, paragraph_id: u32) -> Option<&Revision> {
        self.revisions.get(&paragraph_id)
    }

    /// The accepted revision for a paragraph, if any.
    pub fn accepted_for(&self, paragraph_id: u32) -> Option<&Revision> {
        self.revisions
            .get(&paragraph_id)
            .filter(|rev| rev.accepted)
    }

    /// Iterate revisions in paragraph-id order.
    pub fn iter(&self) -> impl Iterator<Item = &Revision> {
        self.revisions.values()
    }

    /// Number of revisions in the set (accepted or not).
    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

impl FromIterator<Revision> for RevisionSet {
    fn from_iter<T: IntoIterator<Item = Revision>>(iter: T) -> Self {
        let mut set = Self::new();
        for revision in iter {
            set.insert(revision);
        }
        set
    }
}

/// Output fidelity of a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fidelity {
    /// Silent text replacement, no attribution markup
    Clean,
    /// Insertion/deletion markup with author and timestamp attribution
    Tracked,
    /// Tracked markup was requested but unavailable; clean replacement
    /// was produced instead. The attribution trail is absent.
    CleanFallback,
}

/// One revision actually applied during a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedRevision {
    /// Target paragraph id
    pub paragraph_id: u32,

    /// Container text before the change
    pub original: String,

    /// Text after the change
    pub revised: String,

    /// Caller-supplied rationale, if any
    pub rationale: Option<String>,
}

/// Result of a rebuild pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildReport {
    /// What kind of output was produced
    pub fidelity: Fidelity,

    /// Number of paragraphs actually changed
    pub changes: u32,

    /// The revisions that were applied, in document order
    pub applied: Vec<AppliedRevision>,
}

impl RebuildReport {
    /// Check if the rebuild changed nothing.
    pub fn is_noop(&self) -> bool {
        self.changes == 0
    }

    /// Whether the requested fidelity was degraded.
    pub fn is_degraded(&self) -> bool {
        self.fidelity == Fidelity::CleanFallback
    }
}
