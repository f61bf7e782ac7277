//! Document model construction from the raw block stream.
//!
//! Walks blocks in original order with one global 1-based paragraph id
//! counter shared between top-level and table-cell paragraphs. All
//! running state lives in the builder instance, so concurrent documents
//! parse without cross-talk.

use std::collections::{HashMap, HashSet};

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{
    Block, DefinedTerm, DocumentModel, Exhibit, Metadata, Paragraph, SectionEntry, StyleInfo,
    Table, TableCell, TableRow,
};
use crate::parser::numbering::{infer_level, ListNumbering, PatternCascade, TextMarker};
use crate::parser::options::{ErrorMode, ParseOptions};
use crate::parser::package::DocxPackage;
use crate::parser::tracker::SectionTracker;
use crate::parser::wml::{self, RawBlock, RawParagraph, RawTable};

/// Build the document model from an opened package.
pub(crate) fn build_model(package: &DocxPackage, options: &ParseOptions) -> Result<DocumentModel> {
    let document_xml = package.document_xml()?;

    let style_names = match package.styles_xml() {
        Some(xml) => wml::read_style_names(&xml).unwrap_or_else(|e| {
            log::warn!("unreadable style catalog, using raw style ids: {}", e);
            HashMap::new()
        }),
        None => HashMap::new(),
    };

    let metadata = match package.core_xml() {
        Some(xml) => wml::read_core_properties(&xml).unwrap_or_else(|e| {
            log::warn!("unreadable core properties: {}", e);
            Metadata::default()
        }),
        None => Metadata::default(),
    };

    build_from_xml(&document_xml, &style_names, metadata, options)
}

/// Build the document model from the main part's XML.
pub(crate) fn build_from_xml(
    document_xml: &str,
    style_names: &HashMap<String, String>,
    metadata: Metadata,
    options: &ParseOptions,
) -> Result<DocumentModel> {
    let blocks = wml::read_blocks(document_xml)?;
    let mut builder = ModelBuilder::new(style_names, options);

    let mut content = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            RawBlock::Paragraph(raw) => {
                content.push(Block::Paragraph(builder.process_paragraph(raw, false)?));
            }
            RawBlock::Table(rows) => {
                content.push(Block::Table(builder.process_table(rows)?));
            }
        }
    }

    Ok(builder.finish(metadata, content))
}

struct ModelBuilder<'a> {
    style_names: &'a HashMap<String, String>,
    options: &'a ParseOptions,
    cascade: PatternCascade,
    list: ListNumbering,
    tracker: SectionTracker,
    caption_break: Regex,
    first_sentence: Regex,
    quoted_term: Regex,
    paren_term: Regex,
    exhibit_header: Regex,
    next_id: u32,
    sections: Vec<SectionEntry>,
    defined_terms: Vec<DefinedTerm>,
    seen_terms: HashSet<String>,
    exhibits: Vec<Exhibit>,
}

impl<'a> ModelBuilder<'a> {
    fn new(style_names: &'a HashMap<String, String>, options: &'a ParseOptions) -> Self {
        Self {
            style_names,
            options,
            cascade: PatternCascade::new(),
            list: ListNumbering::new(),
            tracker: SectionTracker::new(),
            caption_break: Regex::new(r"^([^.]+\.)\s{2,}").expect("caption pattern"),
            first_sentence: Regex::new(r"^([^.]+\.)").expect("sentence pattern"),
            quoted_term: Regex::new(r#""([A-Z][^"]+)""#).expect("term pattern"),
            paren_term: Regex::new(r#"\((?:the\s+)?"([A-Z][^"]+)"\)"#).expect("term pattern"),
            exhibit_header: Regex::new(r"(?i)^exhibit\s+[a-z0-9]").expect("exhibit pattern"),
            next_id: 0,
            sections: Vec::new(),
            defined_terms: Vec::new(),
            seen_terms: HashSet::new(),
            exhibits: Vec::new(),
        }
    }

    fn finish(mut self, metadata: Metadata, content: Vec<Block>) -> DocumentModel {
        self.defined_terms.sort_by(|a, b| a.term.cmp(&b.term));
        DocumentModel {
            metadata,
            content,
            sections: self.sections,
            defined_terms: self.defined_terms,
            exhibits: self.exhibits,
        }
    }

    /// Process one paragraph; `in_table` suppresses tracker updates and
    /// index extraction, since tables inherit the surrounding hierarchy.
    fn process_paragraph(&mut self, raw: RawParagraph, in_table: bool) -> Result<Paragraph> {
        self.next_id += 1;
        let id = self.next_id;
        let text = raw.text.trim().to_string();

        let style_name = match &raw.style_id {
            Some(style_id) => self
                .style_names
                .get(style_id)
                .cloned()
                .unwrap_or_else(|| style_id.clone()),
            None => "Normal".to_string(),
        };
        let is_heading = style_name.to_lowercase().starts_with("heading");

        if let Some(detail) = raw.malformed {
            if self.options.error_mode == ErrorMode::Strict {
                return Err(Error::MalformedParagraph { id, detail });
            }
            log::debug!("paragraph {} has malformed style data: {}", id, detail);
            return Ok(Paragraph {
                id,
                text,
                marker: None,
                section_ref: None,
                caption: None,
                style: StyleInfo {
                    name: style_name,
                    is_heading,
                    numbering: None,
                },
                section_hierarchy: Vec::new(),
            });
        }

        let marker = self.cascade.match_marker(&text);
        let caption = match &marker {
            Some(m) => self.extract_caption(&m.remainder),
            None => self.extract_caption(&text),
        };

        if !in_table {
            self.track_section(&marker, &raw, &caption);
        }

        let section_ref = self.tracker.section_ref();
        let hierarchy = self.tracker.hierarchy();

        if !in_table {
            let top_level = marker.as_ref().is_some_and(|m| m.kind.is_top_level());
            if is_heading || top_level {
                self.sections.push(SectionEntry {
                    paragraph_id: id,
                    label: marker.as_ref().map(|m| m.label.clone()),
                    title: caption
                        .clone()
                        .unwrap_or_else(|| truncate_chars(&text, 50)),
                    hierarchy: hierarchy.clone(),
                });
            }

            if self.exhibit_header.is_match(&text) {
                self.exhibits.push(Exhibit {
                    paragraph_id: id,
                    title: text.clone(),
                });
            }

            if self.options.extract_terms {
                self.collect_terms(&text, id, section_ref.clone());
            }
        }

        Ok(Paragraph {
            id,
            text,
            marker: marker.map(|m| m.label),
            section_ref,
            caption,
            style: StyleInfo {
                name: style_name,
                is_heading,
                numbering: raw.numbering,
            },
            section_hierarchy: hierarchy,
        })
    }

    /// Offer a numbering signal to the tracker. Explicit text markers
    /// win; list-style numbering applies only when no marker matched.
    fn track_section(
        &mut self,
        marker: &Option<TextMarker>,
        raw: &RawParagraph,
        caption: &Option<String>,
    ) {
        if let Some(m) = marker {
            let level = match &raw.numbering {
                Some(numbering) => numbering.level,
                None => infer_level(m.kind, self.tracker.last_level()),
            };
            self.tracker.update(level, m.label.clone(), caption.clone());
        } else if let Some(numbering) = &raw.numbering {
            let label = self.list.advance(&numbering.num_id, numbering.level);
            self.tracker.update(numbering.level, label, caption.clone());
        }
        // Heading-styled paragraphs with neither signal are indexed but
        // leave the hierarchy unchanged.
    }

    /// Process a table cell-by-cell, row-major. Cell paragraphs share
    /// the global id sequence but never update the tracker.
    fn process_table(&mut self, rows: RawTable) -> Result<Table> {
        let section_hierarchy = self.tracker.hierarchy();
        let mut table_rows = Vec::with_capacity(rows.len());

        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                let mut paragraphs = Vec::with_capacity(cell.len());
                for raw in cell {
                    paragraphs.push(self.process_paragraph(raw, true)?);
                }
                cells.push(TableCell { paragraphs });
            }
            table_rows.push(TableRow { cells });
        }

        Ok(Table {
            rows: table_rows,
            section_hierarchy,
        })
    }

    /// Extract a caption from the text following a numbering label.
    ///
    /// A short sentence set off by a double space wins; otherwise the
    /// first sentence when it fits, otherwise an ellipsized prefix.
    fn extract_caption(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(caps) = self.caption_break.captures(text) {
            return Some(caps[1].trim().to_string());
        }

        if let Some(caps) = self.first_sentence.captures(text) {
            let sentence = caps[1].trim();
            if sentence.chars().count() <= self.options.caption_limit {
                return Some(sentence.to_string());
            }
        }

        if text.chars().count() > self.options.caption_limit {
            let prefix: String = text.chars().take(self.options.caption_limit).collect();
            return Some(format!("{}...", prefix.trim_end()));
        }

        Some(text.to_string())
    }

    /// Collect quoted-capitalized and parenthetical defined terms.
    /// First occurrence wins.
    fn collect_terms(&mut self, text: &str, paragraph_id: u32, section_ref: Option<String>) {
        let mut found: Vec<String> = self
            .quoted_term
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect();
        found.extend(
            self.paren_term
                .captures_iter(text)
                .map(|c| c[1].to_string()),
        );

        for term in found {
            if self.seen_terms.insert(term.clone()) {
                self.defined_terms.push(DefinedTerm {
                    term,
                    first_paragraph: paragraph_id,
                    section_ref: section_ref.clone(),
                });
            }
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
