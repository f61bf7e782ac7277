//! Section hierarchy node.

use serde::{Deserialize, Serialize};

/// One node of the section hierarchy active at a paragraph.
///
/// In any hierarchy list, node levels strictly increase by position and
/// level 0 is always present when the list is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionNode {
    /// Nesting level (0 = outermost)
    pub level: u8,

    /// Section label as it appears (or is generated), e.g. `"7."`,
    /// `"Section 5.3"`, `"(ii)"`
    pub label: String,

    /// Caption text following the label, if any
    pub caption: Option<String>,
}

impl SectionNode {
    /// Create a new node.
    pub fn new(level: u8, label: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            level,
            label: label.into(),
            caption,
        }
    }

    /// The label with the `Article`/`Section` keyword prefix and trailing
    /// punctuation stripped, as used in flattened references.
    pub fn ref_part(&self) -> &str {
        let label = self.label.trim();
        let lower = label.to_ascii_lowercase();
        let stripped = if let Some(rest) = lower.strip_prefix("article") {
            &label[label.len() - rest.len()..]
        } else if let Some(rest) = lower.strip_prefix("section") {
            &label[label.len() - rest.len()..]
        } else {
            label
        };
        stripped.trim_start().trim_end_matches('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_part_strips_trailing_dot() {
        let node = SectionNode::new(0, "7.", None);
        assert_eq!(node.ref_part(), "7");
    }

    #[test]
    fn test_ref_part_strips_keyword() {
        let node = SectionNode::new(0, "Section 5.3", None);
        assert_eq!(node.ref_part(), "5.3");

        let node = SectionNode::new(0, "ARTICLE IV", None);
        assert_eq!(node.ref_part(), "IV");
    }

    #[test]
    fn test_ref_part_keeps_parens() {
        let node = SectionNode::new(2, "(ii)", None);
        assert_eq!(node.ref_part(), "(ii)");
    }
}
