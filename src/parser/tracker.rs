//! Section hierarchy tracking across the block stream.

use crate::model::SectionNode;

/// Sequential state tracking the section hierarchy as blocks are walked.
///
/// The stack is per-parse state: one tracker per `build` call, owned by
/// the builder, so concurrent documents cannot cross-talk.
#[derive(Debug, Default)]
pub struct SectionTracker {
    nodes: Vec<SectionNode>,
    last_level: Option<u8>,
}

impl SectionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new section at `level`.
    ///
    /// The stack is truncated to the ancestors above `level` and the new
    /// node appended. Levels deeper than the current stack are clamped to
    /// its depth, so node level always equals position and level 0 is
    /// present whenever the stack is non-empty.
    pub fn update(&mut self, level: u8, label: impl Into<String>, caption: Option<String>) {
        let level = level.min(self.nodes.len() as u8);
        self.nodes.truncate(level as usize);
        self.nodes.push(SectionNode::new(level, label, caption));
        self.last_level = Some(level);
    }

    /// The level most recently entered, if any.
    pub fn last_level(&self) -> Option<u8> {
        self.last_level
    }

    /// Defensive copy of the current hierarchy.
    pub fn hierarchy(&self) -> Vec<SectionNode> {
        self.nodes.clone()
    }

    /// Flattened reference of the current hierarchy, e.g. `"7A(ii)"`.
    pub fn section_ref(&self) -> Option<String> {
        if self.nodes.is_empty() {
            return None;
        }
        Some(
            self.nodes
                .iter()
                .map(|node| node.ref_part())
                .collect::<String>(),
        )
    }
}
