//! Text diffing for tracked-change construction.
//!
//! Word granularity: tokens are words and the whitespace between them,
//! so concatenating the equal+insert spans reconstructs the revised
//! text exactly, and equal+delete spans the original.

use similar::{ChangeTag, TextDiff};

/// Kind of a diff span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Present in both texts
    Equal,
    /// Present only in the original
    Delete,
    /// Present only in the revision
    Insert,
}

/// A maximal run of same-kind tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSpan {
    /// What happened to this span
    pub kind: SpanKind,

    /// The span text
    pub text: String,
}

/// Compute merged diff spans between two texts.
pub fn diff_spans(original: &str, revised: &str) -> Vec<DiffSpan> {
    let diff = TextDiff::from_words(original, revised);
    let mut spans: Vec<DiffSpan> = Vec::new();

    for change in diff.iter_all_changes() {
        let kind = match change.tag() {
            ChangeTag::Equal => SpanKind::Equal,
            ChangeTag::Delete => SpanKind::Delete,
            ChangeTag::Insert => SpanKind::Insert,
        };

        match spans.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(change.value()),
            _ => spans.push(DiffSpan {
                kind,
                text: change.value().to_string(),
            }),
        }
    }

    spans
}

/// Reassemble one side of a span list.
#[cfg(test)]
fn reconstruct(spans: &[DiffSpan], keep: SpanKind) -> String {
    spans
        .iter()
        .filter(|span| span.kind == SpanKind::Equal || span.kind == keep)
        .map(|span| span.text.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts() {
        let spans = diff_spans("same text", "same text");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, SpanKind::Equal);
        assert_eq!(spans[0].text, "same text");
    }

    #[test]
    fn test_word_replacement() {
        let original = "The Closing shall occur promptly.";
        let revised = "The Closing shall occur no later than 30 days.";
        let spans = diff_spans(original, revised);

        assert!(spans.iter().any(|s| s.kind == SpanKind::Delete));
        assert!(spans.iter().any(|s| s.kind == SpanKind::Insert));
        assert_eq!(reconstruct(&spans, SpanKind::Delete), original);
        assert_eq!(reconstruct(&spans, SpanKind::Insert), revised);
    }

    #[test]
    fn test_pure_insertion() {
        let spans = diff_spans("base", "base plus more");
        assert_eq!(reconstruct(&spans, SpanKind::Insert), "base plus more");
        assert_eq!(reconstruct(&spans, SpanKind::Delete), "base");
    }

    #[test]
    fn test_pure_deletion() {
        let spans = diff_spans("keep and drop this", "keep");
        assert_eq!(reconstruct(&spans, SpanKind::Delete), "keep and drop this");
        assert_eq!(reconstruct(&spans, SpanKind::Insert), "keep");
    }

    #[test]
    fn test_full_rewrite_reconstructs_both_sides() {
        let original = "entirely different opening language";
        let revised = "completely new replacement wording here";
        let spans = diff_spans(original, revised);
        assert_eq!(reconstruct(&spans, SpanKind::Delete), original);
        assert_eq!(reconstruct(&spans, SpanKind::Insert), revised);
    }

    #[test]
    fn test_empty_original() {
        let spans = diff_spans("", "new paragraph text");
        assert_eq!(reconstruct(&spans, SpanKind::Insert), "new paragraph text");
        assert_eq!(reconstruct(&spans, SpanKind::Delete), "");
    }
}
