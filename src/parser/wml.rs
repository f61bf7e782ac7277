//! WordprocessingML part readers.
//!
//! Produces the raw block stream the model builder walks, plus the style
//! catalog and core properties. The traversal rules here (direct cell
//! paragraphs only, nested tables skipped) are mirrored exactly by the
//! revision engine so parse-time and rebuild-time walks agree
//! positionally.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::{Metadata, NumberingRef};

/// A paragraph as read from the container, before model stamping.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawParagraph {
    /// Concatenated run text (`w:t`, tabs, breaks)
    pub text: String,

    /// Paragraph style id (`w:pStyle`)
    pub style_id: Option<String>,

    /// Numbering reference (`w:numPr`), when complete
    pub numbering: Option<NumberingRef>,

    /// Detail of unparseable style/numbering data, if any
    pub malformed: Option<String>,
}

/// A raw table: rows of cells of direct paragraphs.
pub(crate) type RawTable = Vec<Vec<Vec<RawParagraph>>>;

/// A block of the document body in original order.
#[derive(Debug)]
pub(crate) enum RawBlock {
    Paragraph(RawParagraph),
    Table(RawTable),
}

/// Read the body block stream of `word/document.xml`.
pub(crate) fn read_blocks(xml: &str) -> Result<Vec<RawBlock>> {
    let mut reader = Reader::from_str(xml);
    let mut blocks = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => blocks.push(RawBlock::Paragraph(read_paragraph(&mut reader)?)),
                b"tbl" => blocks.push(RawBlock::Table(read_table(&mut reader)?)),
                b"sectPr" => {
                    reader.read_to_end(e.name())?;
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                blocks.push(RawBlock::Paragraph(RawParagraph::default()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(blocks)
}

/// Read one paragraph subtree; the `w:p` start tag is already consumed.
fn read_paragraph(reader: &mut Reader<&[u8]>) -> Result<RawParagraph> {
    let mut para = RawParagraph::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"pPr" => read_paragraph_props(reader, &mut para)?,
                b"t" => {
                    let text = reader.read_text(e.name())?;
                    para.text.push_str(&text);
                }
                // Anchored drawings and text boxes hold paragraphs of
                // their own; those are not addressable body content.
                b"drawing" | b"pict" | b"object" | b"p" => {
                    reader.read_to_end(e.name())?;
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => para.text.push('\t'),
                b"br" | b"cr" => para.text.push('\n'),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"p" => break,
            Event::Eof => return Err(Error::Xml("unterminated w:p element".to_string())),
            _ => {}
        }
    }

    Ok(para)
}

/// Read `w:pPr`, filling style id and numbering reference.
fn read_paragraph_props(reader: &mut Reader<&[u8]>, para: &mut RawParagraph) -> Result<()> {
    let mut ilvl: Option<std::result::Result<u8, String>> = None;
    let mut num_id: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"pStyle" => para.style_id = attr_value(&e, "w:val")?,
                b"ilvl" => {
                    ilvl = Some(match attr_value(&e, "w:val")? {
                        Some(raw) => raw
                            .parse::<u8>()
                            .map_err(|_| format!("bad w:ilvl value: {:?}", raw)),
                        None => Err("w:ilvl without w:val".to_string()),
                    });
                }
                b"numId" => num_id = attr_value(&e, "w:val")?,
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"pPr" => break,
            Event::Eof => return Err(Error::Xml("unterminated w:pPr element".to_string())),
            _ => {}
        }
    }

    match (ilvl, num_id) {
        (Some(Ok(level)), Some(num_id)) => {
            para.numbering = Some(NumberingRef { num_id, level });
        }
        (Some(Err(detail)), _) => para.malformed = Some(detail),
        // An incomplete w:numPr carries no usable signal
        _ => {}
    }

    Ok(())
}

/// Read one table subtree; the `w:tbl` start tag is already consumed.
fn read_table(reader: &mut Reader<&[u8]>) -> Result<RawTable> {
    let mut rows: RawTable = Vec::new();
    let mut current_row: Option<Vec<Vec<RawParagraph>>> = None;
    let mut current_cell: Option<Vec<RawParagraph>> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tr" => current_row = Some(Vec::new()),
                b"tc" => current_cell = Some(Vec::new()),
                b"p" => {
                    let para = read_paragraph(reader)?;
                    if let Some(cell) = current_cell.as_mut() {
                        cell.push(para);
                    }
                }
                // Nested tables are not addressed; their paragraphs
                // receive no ids.
                b"tbl" => {
                    reader.read_to_end(e.name())?;
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                if let Some(cell) = current_cell.as_mut() {
                    cell.push(RawParagraph::default());
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"tc" => {
                    if let (Some(row), Some(cell)) = (current_row.as_mut(), current_cell.take()) {
                        row.push(cell);
                    }
                }
                b"tr" => rows.push(current_row.take().unwrap_or_default()),
                b"tbl" => break,
                _ => {}
            },
            Event::Eof => return Err(Error::Xml("unterminated w:tbl element".to_string())),
            _ => {}
        }
    }

    Ok(rows)
}

/// Map `w:styleId` to the human style name from `word/styles.xml`.
pub(crate) fn read_style_names(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut names = HashMap::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"style" => current = attr_value(&e, "w:styleId")?,
                b"name" => {
                    if let (Some(id), Some(name)) = (current.as_ref(), attr_value(&e, "w:val")?) {
                        names.insert(id.clone(), name);
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"style" => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(names)
}

/// Read `docProps/core.xml` into document metadata.
pub(crate) fn read_core_properties(xml: &str) -> Result<Metadata> {
    let mut reader = Reader::from_str(xml);
    let mut metadata = Metadata::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"title" => metadata.title = non_empty(&reader.read_text(e.name())?),
                b"creator" => metadata.author = non_empty(&reader.read_text(e.name())?),
                b"created" => metadata.created = parse_w3cdtf(&reader.read_text(e.name())?),
                b"modified" => metadata.modified = parse_w3cdtf(&reader.read_text(e.name())?),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(metadata)
}

/// Get an unescaped attribute value by qualified name.
fn attr_value(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    element
        .try_get_attribute(name)
        .map_err(|e| Error::Xml(e.to_string()))?
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .map_err(|e| Error::Xml(e.to_string()))
        })
        .transpose()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn parse_w3cdtf(text: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}
