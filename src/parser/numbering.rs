//! Numbering resolution: explicit text markers and auto-list counters.
//!
//! Two independent numbering sources feed the section tracker. Explicit
//! text markers always win over list-style numbering; the cascade below
//! is evaluated in a fixed order because ordering is a semantic
//! invariant, not an implementation detail.

use regex::Regex;

/// Kind of explicit text marker matched by the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `ARTICLE IV` / `Article 4`
    Article,
    /// `Section 5.3`
    Section,
    /// `1.2.3`
    DottedTriple,
    /// `1.2`
    DottedPair,
    /// `1.` followed by whitespace
    Numbered,
    /// `A.`
    UpperLetter,
    /// `a.`
    LowerLetter,
    /// `(A)`
    ParenUpper,
    /// `(a)`
    ParenLower,
    /// `(1)`
    ParenNumber,
    /// `(ii)`
    ParenRomanLower,
    /// `(II)`
    ParenRomanUpper,
}

impl MarkerKind {
    /// Whether this marker opens a top-level section for the index.
    pub fn is_top_level(self) -> bool {
        matches!(
            self,
            MarkerKind::Article | MarkerKind::Section | MarkerKind::Numbered
        )
    }
}

/// An explicit numbering marker extracted from paragraph text.
#[derive(Debug, Clone)]
pub struct TextMarker {
    /// Normalized label, e.g. `"Section 5.3"`, `"A."`, `"(ii)"`
    pub label: String,

    /// Text following the marker, used for caption extraction
    pub remainder: String,

    /// Which cascade pattern matched
    pub kind: MarkerKind,
}

/// Whether a paren-style label must be reconstructed around the capture.
fn wraps_parens(kind: MarkerKind) -> bool {
    matches!(
        kind,
        MarkerKind::ParenUpper
            | MarkerKind::ParenLower
            | MarkerKind::ParenNumber
            | MarkerKind::ParenRomanLower
            | MarkerKind::ParenRomanUpper
    )
}

/// The ordered pattern cascade for explicit text markers.
///
/// First match wins. The `Article`/`Section` keywords match
/// case-insensitively; everything else is case-sensitive.
pub struct PatternCascade {
    patterns: Vec<(Regex, MarkerKind)>,
}

impl PatternCascade {
    /// Compile the cascade. Patterns are fixed; the order is load-bearing.
    pub fn new() -> Self {
        let table: &[(&str, MarkerKind)] = &[
            (
                r"(?i)^(article\s+(?:[ivxlcdm]+|\d+))[.\s:]+(.*)$",
                MarkerKind::Article,
            ),
            (
                r"(?i)^(section\s+\d+\.[\d.A-Za-z()]+)[.\s:]+(.*)$",
                MarkerKind::Section,
            ),
            (r"(?i)^(section\s+\d+)[.\s:]+(.*)$", MarkerKind::Section),
            (r"^(\d+\.\d+\.\d+\.?)\s*(.*)$", MarkerKind::DottedTriple),
            (r"^(\d+\.\d+\.?)\s*(.*)$", MarkerKind::DottedPair),
            (r"^(\d+\.)\s+(.*)$", MarkerKind::Numbered),
            (r"^([A-Z]\.)\s+(.*)$", MarkerKind::UpperLetter),
            (r"^([a-z]\.)\s+(.*)$", MarkerKind::LowerLetter),
            (r"^\(([A-Z])\)\s*(.*)$", MarkerKind::ParenUpper),
            (r"^\(([a-z])\)\s*(.*)$", MarkerKind::ParenLower),
            (r"^\((\d+)\)\s*(.*)$", MarkerKind::ParenNumber),
            (r"^\(([ivxlcdm]+)\)\s*(.*)$", MarkerKind::ParenRomanLower),
            (r"^\(([IVXLCDM]+)\)\s*(.*)$", MarkerKind::ParenRomanUpper),
        ];

        let patterns = table
            .iter()
            .map(|(pattern, kind)| (Regex::new(pattern).expect("cascade pattern"), *kind))
            .collect();

        Self { patterns }
    }

    /// Match the first cascade pattern against trimmed paragraph text.
    pub fn match_marker(&self, text: &str) -> Option<TextMarker> {
        let text = text.trim();
        for (regex, kind) in &self.patterns {
            if let Some(caps) = regex.captures(text) {
                let raw = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
                let label = if wraps_parens(*kind) {
                    format!("({})", raw)
                } else {
                    raw.to_string()
                };
                let remainder = caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                return Some(TextMarker {
                    label,
                    remainder,
                    kind: *kind,
                });
            }
        }
        None
    }
}

impl Default for PatternCascade {
    fn default() -> Self {
        Self::new()
    }
}

/// Infer a hierarchy level for a marker that carries no list level.
///
/// Markers with no inherent depth (bare letters, parenthesized integers)
/// nest one below the previous level; 0 at document start.
pub fn infer_level(kind: MarkerKind, last_level: Option<u8>) -> u8 {
    match kind {
        MarkerKind::Article | MarkerKind::Section | MarkerKind::Numbered => 0,
        MarkerKind::DottedPair => 1,
        MarkerKind::DottedTriple
        | MarkerKind::ParenUpper
        | MarkerKind::ParenLower
        | MarkerKind::ParenRomanLower
        | MarkerKind::ParenRomanUpper => 2,
        MarkerKind::UpperLetter | MarkerKind::LowerLetter | MarkerKind::ParenNumber => {
            last_level.map(|l| l.saturating_add(1)).unwrap_or(0)
        }
    }
}

/// Running counters for list-style auto-numbering.
///
/// Counters reset when the active list id changes; advancing a level
/// discards every deeper counter, so siblings restart at 1 after a
/// shallower sibling moves on (standard outline semantics).
#[derive(Debug, Default)]
pub struct ListNumbering {
    counters: Vec<(u8, u32)>,
    active_list: Option<String>,
}

impl ListNumbering {
    /// Create a fresh counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter at `level` for list `num_id` and render the
    /// generated label.
    pub fn advance(&mut self, num_id: &str, level: u8) -> String {
        if self.active_list.as_deref() != Some(num_id) {
            self.counters.clear();
            self.active_list = Some(num_id.to_string());
        }

        self.counters.retain(|(l, _)| *l <= level);

        match self.counters.iter_mut().find(|(l, _)| *l == level) {
            Some((_, count)) => *count += 1,
            None => self.counters.push((level, 1)),
        }

        let count = self.count_at(level);
        render_label(level, count)
    }

    fn count_at(&self, level: u8) -> u32 {
        self.counters
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, c)| *c)
            .unwrap_or(1)
    }
}

/// Render a generated label for a list level and ordinal.
fn render_label(level: u8, count: u32) -> String {
    match level {
        0 => format!("{}.", count),
        1 => format!("{}.", letter_label(count)),
        2 => format!("({})", to_roman(count).to_lowercase()),
        _ => format!("({})", count),
    }
}

/// A, B, ... Z, then A1, A2, ... for ordinals past 26.
fn letter_label(count: u32) -> String {
    if count <= 26 {
        char::from(b'A' + (count - 1) as u8).to_string()
    } else {
        format!("A{}", count - 26)
    }
}

/// Convert an ordinal to an uppercase roman numeral.
fn to_roman(mut num: u32) -> String {
    const VALUES: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut out = String::new();
    for (value, symbol) in VALUES {
        while num >= value {
            num -= value;
            out.push_str(symbol);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_marker() {
        let cascade = PatternCascade::new();
        let m = cascade.match_marker("ARTICLE IV. DEFINITIONS").unwrap();
        assert_eq!(m.label, "ARTICLE IV");
        assert_eq!(m.remainder, "DEFINITIONS");
        assert_eq!(m.kind, MarkerKind::Article);
    }

    #[test]
    fn test_section_marker_with_caption() {
        let cascade = PatternCascade::new();
        let m = cascade
            .match_marker("Section 5.3  Closing Date.  The Closing shall occur...")
            .unwrap();
        assert_eq!(m.label, "Section 5.3");
        assert_eq!(m.kind, MarkerKind::Section);
        assert!(m.remainder.starts_with("Closing Date."));
    }

    #[test]
    fn test_explicit_order_dotted_before_bare() {
        let cascade = PatternCascade::new();
        let m = cascade.match_marker("1.2.3 Deep clause").unwrap();
        assert_eq!(m.kind, MarkerKind::DottedTriple);
        assert_eq!(m.label, "1.2.3");

        let m = cascade.match_marker("1.2 Subsection text").unwrap();
        assert_eq!(m.kind, MarkerKind::DottedPair);

        let m = cascade.match_marker("1. Top level").unwrap();
        assert_eq!(m.kind, MarkerKind::Numbered);
    }

    #[test]
    fn test_paren_markers_normalized() {
        let cascade = PatternCascade::new();
        let m = cascade.match_marker("(a) small item").unwrap();
        assert_eq!(m.label, "(a)");
        assert_eq!(m.kind, MarkerKind::ParenLower);

        let m = cascade.match_marker("(ii) roman item").unwrap();
        assert_eq!(m.label, "(ii)");
        assert_eq!(m.kind, MarkerKind::ParenRomanLower);
    }

    #[test]
    fn test_no_marker() {
        let cascade = PatternCascade::new();
        assert!(cascade
            .match_marker("The parties agree as follows:")
            .is_none());
        // A year with a period is not a section marker without whitespace
        assert!(cascade.match_marker("2024.Closing").is_none());
    }

    #[test]
    fn test_infer_level() {
        assert_eq!(infer_level(MarkerKind::Article, Some(3)), 0);
        assert_eq!(infer_level(MarkerKind::DottedPair, None), 1);
        assert_eq!(infer_level(MarkerKind::ParenRomanUpper, None), 2);
        assert_eq!(infer_level(MarkerKind::UpperLetter, Some(0)), 1);
        assert_eq!(infer_level(MarkerKind::UpperLetter, None), 0);
    }

    #[test]
    fn test_counter_restart_on_shallower_advance() {
        let mut list = ListNumbering::new();
        assert_eq!(list.advance("7", 0), "1.");
        assert_eq!(list.advance("7", 1), "A.");
        assert_eq!(list.advance("7", 1), "B.");
        assert_eq!(list.advance("7", 0), "2.");
        // Level-1 counter was discarded when level 0 advanced
        assert_eq!(list.advance("7", 1), "A.");
    }

    #[test]
    fn test_counter_reset_on_list_change() {
        let mut list = ListNumbering::new();
        assert_eq!(list.advance("7", 0), "1.");
        assert_eq!(list.advance("7", 0), "2.");
        assert_eq!(list.advance("8", 0), "1.");
    }

    #[test]
    fn test_deep_level_labels() {
        let mut list = ListNumbering::new();
        list.advance("5", 0);
        list.advance("5", 1);
        assert_eq!(list.advance("5", 2), "(i)");
        assert_eq!(list.advance("5", 2), "(ii)");
        assert_eq!(list.advance("5", 3), "(1)");
    }

    #[test]
    fn test_letter_label_wraps_past_z() {
        assert_eq!(letter_label(1), "A");
        assert_eq!(letter_label(26), "Z");
        assert_eq!(letter_label(27), "A1");
    }

    #[test]
    fn test_to_roman() {
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(9), "IX");
        assert_eq!(to_roman(14), "XIV");
        assert_eq!(to_roman(1987), "MCMLXXXVII");
    }
}
