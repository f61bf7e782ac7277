//! Revision application: clean and tracked rebuilds of the original
//! container.

mod diff;
mod engine;
mod options;
mod revision;

pub use diff::{diff_spans, DiffSpan, SpanKind};
pub use engine::{
    generate_documents, rebuild_clean, rebuild_clean_bytes, rebuild_tracked,
    rebuild_tracked_bytes,
};
pub use options::ReviseOptions;
pub use revision::{AppliedRevision, Fidelity, RebuildReport, Revision, RevisionSet};
