//! Revision application against the original container.
//!
//! Both output modes rewrite only the targeted `w:p` ranges of the main
//! document part; every other byte passes through untouched. The
//! paragraph walk counts ids with exactly the rules the parser uses
//! (direct cell paragraphs only, nested tables skipped), so positions
//! correspond without re-deriving ids from content.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;
use crate::parser::DocxPackage;
use crate::revise::diff::{diff_spans, SpanKind};
use crate::revise::options::ReviseOptions;
use crate::revise::revision::{AppliedRevision, Fidelity, RebuildReport, RevisionSet};

/// Rebuild with silent text replacement, writing the output atomically.
pub fn rebuild_clean<P: AsRef<Path>, Q: AsRef<Path>>(
    original: P,
    revisions: &RevisionSet,
    output: Q,
) -> Result<RebuildReport> {
    let package = DocxPackage::open(original)?;
    let (rebuilt, report) = rebuild_clean_package(&package, revisions)?;
    rebuilt.save(output)?;
    Ok(report)
}

/// Rebuild with tracked-change markup, writing the output atomically.
///
/// Falls back to clean replacement when attributed markup cannot be
/// produced; the degradation is logged and reported, never silent.
pub fn rebuild_tracked<P: AsRef<Path>, Q: AsRef<Path>>(
    original: P,
    revisions: &RevisionSet,
    output: Q,
    options: &ReviseOptions,
) -> Result<RebuildReport> {
    let package = DocxPackage::open(original)?;
    let (rebuilt, report) = rebuild_tracked_package(&package, revisions, options)?;
    rebuilt.save(output)?;
    Ok(report)
}

/// Rebuild clean from container bytes.
pub fn rebuild_clean_bytes(
    data: &[u8],
    revisions: &RevisionSet,
) -> Result<(Vec<u8>, RebuildReport)> {
    let package = DocxPackage::from_bytes(data)?;
    let (rebuilt, report) = rebuild_clean_package(&package, revisions)?;
    Ok((rebuilt.to_bytes()?, report))
}

/// Rebuild tracked from container bytes.
pub fn rebuild_tracked_bytes(
    data: &[u8],
    revisions: &RevisionSet,
    options: &ReviseOptions,
) -> Result<(Vec<u8>, RebuildReport)> {
    let package = DocxPackage::from_bytes(data)?;
    let (rebuilt, report) = rebuild_tracked_package(&package, revisions, options)?;
    Ok((rebuilt.to_bytes()?, report))
}

/// Produce the clean/tracked output pair from one original.
pub fn generate_documents<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
    original: P,
    revisions: &RevisionSet,
    clean_output: Q,
    tracked_output: R,
    options: &ReviseOptions,
) -> Result<(RebuildReport, RebuildReport)> {
    let package = DocxPackage::open(original)?;

    let (clean, clean_report) = rebuild_clean_package(&package, revisions)?;
    clean.save(clean_output)?;

    let (tracked, tracked_report) = rebuild_tracked_package(&package, revisions, options)?;
    tracked.save(tracked_output)?;

    Ok((clean_report, tracked_report))
}

fn rebuild_clean_package(
    package: &DocxPackage,
    revisions: &RevisionSet,
) -> Result<(DocxPackage, RebuildReport)> {
    let xml = package.document_xml()?;
    let (new_xml, applied) = rewrite_document(&xml, revisions, &Mode::Clean)?;
    let report = RebuildReport {
        fidelity: Fidelity::Clean,
        changes: applied.len() as u32,
        applied,
    };
    Ok((package.with_document_xml(&new_xml), report))
}

fn rebuild_tracked_package(
    package: &DocxPackage,
    revisions: &RevisionSet,
    options: &ReviseOptions,
) -> Result<(DocxPackage, RebuildReport)> {
    let xml = package.document_xml()?;
    let date = options.markup_date();
    let mode = Mode::Tracked {
        author: &options.author,
        date: &date,
    };

    let (new_xml, applied, fidelity) = match rewrite_document(&xml, revisions, &mode) {
        Ok((new_xml, applied)) => (new_xml, applied, Fidelity::Tracked),
        Err(e) => {
            log::warn!(
                "tracked-changes markup unavailable ({}); falling back to clean replacement",
                e
            );
            let (new_xml, applied) = rewrite_document(&xml, revisions, &Mode::Clean)?;
            (new_xml, applied, Fidelity::CleanFallback)
        }
    };

    let report = RebuildReport {
        fidelity,
        changes: applied.len() as u32,
        applied,
    };
    Ok((package.with_document_xml(&new_xml), report))
}

enum Mode<'a> {
    Clean,
    Tracked { author: &'a str, date: &'a str },
}

/// Rewrite the main part, splicing replacement paragraphs over the
/// byte ranges of revised `w:p` elements.
fn rewrite_document(
    xml: &str,
    revisions: &RevisionSet,
    mode: &Mode<'_>,
) -> Result<(String, Vec<AppliedRevision>)> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::with_capacity(xml.len());
    let mut applied = Vec::new();

    // Source offset up to which `out` has been filled
    let mut copied = 0usize;
    let mut next_id: u32 = 0;
    let mut markup_id: u32 = 0;
    let mut table_depth: u32 = 0;
    let mut in_cell = false;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    let span = reader.read_to_end(e.name())?;
                    if table_depth > 0 && !in_cell {
                        continue;
                    }
                    next_id += 1;

                    let end = reader.buffer_position() as usize;
                    let inner = &xml[span.start as usize..span.end as usize];
                    let start_tag = &xml[pos..span.start as usize];
                    let end_tag = &xml[span.end as usize..end];

                    if let Some(splice) = replace_paragraph(
                        next_id, inner, start_tag, end_tag, revisions, mode, &mut markup_id,
                        &mut applied,
                    )? {
                        out.push_str(&xml[copied..pos]);
                        out.push_str(&splice);
                        copied = end;
                    }
                }
                b"tbl" => {
                    if in_cell {
                        // Nested table: its paragraphs carry no ids
                        reader.read_to_end(e.name())?;
                    } else {
                        table_depth += 1;
                    }
                }
                b"tc" => in_cell = true,
                b"sectPr" => {
                    reader.read_to_end(e.name())?;
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                if table_depth > 0 && !in_cell {
                    continue;
                }
                next_id += 1;

                let end = reader.buffer_position() as usize;
                let source = &xml[pos..end];
                let start_tag = format!("{}>", source.trim_end_matches("/>"));

                if let Some(splice) = replace_paragraph(
                    next_id, "", &start_tag, "</w:p>", revisions, mode, &mut markup_id,
                    &mut applied,
                )? {
                    out.push_str(&xml[copied..pos]);
                    out.push_str(&splice);
                    copied = end;
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"tc" => in_cell = false,
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    out.push_str(&xml[copied..]);
    Ok((out, applied))
}

/// Build the replacement XML for one paragraph, if a revision applies.
#[allow(clippy::too_many_arguments)]
fn replace_paragraph(
    paragraph_id: u32,
    inner: &str,
    start_tag: &str,
    end_tag: &str,
    revisions: &RevisionSet,
    mode: &Mode<'_>,
    markup_id: &mut u32,
    applied: &mut Vec<AppliedRevision>,
) -> Result<Option<String>> {
    let Some(revision) = revisions.accepted_for(paragraph_id) else {
        return Ok(None);
    };

    let fragment = ParagraphFragment::parse(inner)?;
    let original = fragment.text.trim().to_string();
    if original == revision.revised {
        return Ok(None);
    }

    let mut out = String::new();
    out.push_str(start_tag);
    if let Some(ppr) = fragment.ppr {
        out.push_str(ppr);
    }

    match mode {
        Mode::Clean => {
            out.push_str("<w:r>");
            if let Some(rpr) = fragment.rpr {
                out.push_str(rpr);
            }
            push_text(&mut out, "w:t", &revision.revised);
            out.push_str("</w:r>");
        }
        Mode::Tracked { author, date } => {
            for span in diff_spans(&original, &revision.revised) {
                match span.kind {
                    SpanKind::Equal => {
                        out.push_str("<w:r>");
                        if let Some(rpr) = fragment.rpr {
                            out.push_str(rpr);
                        }
                        push_text(&mut out, "w:t", &span.text);
                        out.push_str("</w:r>");
                    }
                    SpanKind::Delete => {
                        *markup_id += 1;
                        push_revision_wrapper(
                            &mut out,
                            "w:del",
                            *markup_id,
                            author,
                            date,
                            fragment.rpr,
                            "w:delText",
                            &span.text,
                        );
                    }
                    SpanKind::Insert => {
                        *markup_id += 1;
                        push_revision_wrapper(
                            &mut out,
                            "w:ins",
                            *markup_id,
                            author,
                            date,
                            fragment.rpr,
                            "w:t",
                            &span.text,
                        );
                    }
                }
            }
        }
    }

    out.push_str(end_tag);

    applied.push(AppliedRevision {
        paragraph_id,
        original,
        revised: revision.revised.clone(),
        rationale: revision.rationale.clone(),
    });

    Ok(Some(out))
}

/// Emit an attributed `w:ins`/`w:del` wrapper holding one run.
#[allow(clippy::too_many_arguments)]
fn push_revision_wrapper(
    out: &mut String,
    wrapper: &str,
    id: u32,
    author: &str,
    date: &str,
    rpr: Option<&str>,
    text_element: &str,
    text: &str,
) {
    out.push_str(&format!(
        "<{} w:id=\"{}\" w:author=\"{}\" w:date=\"{}\"><w:r>",
        wrapper,
        id,
        escape_attr(author),
        escape_attr(date),
    ));
    if let Some(rpr) = rpr {
        out.push_str(rpr);
    }
    push_text(out, text_element, text);
    out.push_str(&format!("</w:r></{}>", wrapper));
}

/// Emit text content, converting tabs and newlines to their elements.
fn push_text(out: &mut String, element: &str, text: &str) {
    let mut current = String::new();
    let flush = |out: &mut String, current: &mut String| {
        if !current.is_empty() {
            out.push_str(&format!(
                "<{el} xml:space=\"preserve\">{}</{el}>",
                escape_text(current),
                el = element,
            ));
            current.clear();
        }
    };

    for ch in text.chars() {
        match ch {
            '\t' => {
                flush(out, &mut current);
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush(out, &mut current);
                out.push_str("<w:br/>");
            }
            _ => current.push(ch),
        }
    }
    flush(out, &mut current);
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

/// Pieces of the original paragraph needed for a rewrite: its text, the
/// paragraph properties, and the first run's properties (all verbatim
/// source slices).
#[derive(Debug, Default)]
struct ParagraphFragment<'x> {
    text: String,
    ppr: Option<&'x str>,
    rpr: Option<&'x str>,
}

impl<'x> ParagraphFragment<'x> {
    fn parse(inner: &'x str) -> Result<Self> {
        let mut reader = Reader::from_str(inner);
        let mut fragment = Self::default();
        let mut seen_run = false;
        let mut in_first_run = false;

        loop {
            let pos = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"pPr" => {
                        reader.read_to_end(e.name())?;
                        let end = reader.buffer_position() as usize;
                        if fragment.ppr.is_none() {
                            fragment.ppr = Some(&inner[pos..end]);
                        }
                    }
                    b"r" => {
                        if !seen_run {
                            seen_run = true;
                            in_first_run = true;
                        }
                    }
                    b"rPr" => {
                        let name = e.name();
                        reader.read_to_end(name)?;
                        let end = reader.buffer_position() as usize;
                        if in_first_run && fragment.rpr.is_none() {
                            fragment.rpr = Some(&inner[pos..end]);
                        }
                    }
                    b"t" => {
                        let text = reader.read_text(e.name())?;
                        fragment.text.push_str(&text);
                    }
                    b"drawing" | b"pict" | b"object" | b"p" => {
                        reader.read_to_end(e.name())?;
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"tab" => fragment.text.push('\t'),
                    b"br" | b"cr" => fragment.text.push('\n'),
                    b"r" => seen_run = true,
                    b"rPr" => {
                        let end = reader.buffer_position() as usize;
                        if in_first_run && fragment.rpr.is_none() {
                            fragment.rpr = Some(&inner[pos..end]);
                        }
                    }
                    _ => {}
                },
                Event::End(e) if e.local_name().as_ref() == b"r" => in_first_run = false,
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revise::revision::Revision;

    fn body(inner: &str) -> String {
        format!(
            "<w:document xmlns:w=\"http://example\"><w:body>{}</w:body></w:document>",
            inner
        )
    }

    fn one(revision: Revision) -> RevisionSet {
        [revision].into_iter().collect()
    }

    #[test]
    fn test_clean_replacement_preserves_formatting() {
        let xml = body(
            "<w:p><w:pPr><w:pStyle w:val=\"BodyText\"/></w:pPr>\
             <w:r><w:rPr><w:b/><w:i/></w:rPr><w:t>old text</w:t></w:r>\
             <w:r><w:t> second run</w:t></w:r></w:p>",
        );
        let revisions = one(Revision::accepted(1, "old text second run", "brand new text"));
        let (out, applied) = rewrite_document(&xml, &revisions, &Mode::Clean).unwrap();

        assert_eq!(applied.len(), 1);
        assert!(out.contains("<w:pStyle w:val=\"BodyText\"/>"));
        assert!(out.contains("<w:rPr><w:b/><w:i/></w:rPr>"));
        assert!(out.contains("<w:t xml:space=\"preserve\">brand new text</w:t>"));
        // The second run is gone
        assert!(!out.contains("second run"));
    }

    #[test]
    fn test_untouched_paragraphs_pass_through_verbatim() {
        let xml = body(
            "<w:p><w:r><w:t>first</w:t></w:r></w:p>\
             <w:p><w:r><w:t>second</w:t></w:r></w:p>",
        );
        let revisions = one(Revision::accepted(2, "second", "changed"));
        let (out, _) = rewrite_document(&xml, &revisions, &Mode::Clean).unwrap();

        assert!(out.contains("<w:p><w:r><w:t>first</w:t></w:r></w:p>"));
        assert!(out.contains("changed"));
        assert!(!out.contains(">second<"));
    }

    #[test]
    fn test_unknown_and_unaccepted_ids_are_ignored() {
        let xml = body("<w:p><w:r><w:t>alpha</w:t></w:r></w:p>");
        let revisions: RevisionSet = [
            Revision::accepted(42, "missing", "never applied"),
            Revision::rejected(1, "alpha", "beta"),
        ]
        .into_iter()
        .collect();

        let (out, applied) = rewrite_document(&xml, &revisions, &Mode::Clean).unwrap();
        assert!(applied.is_empty());
        assert!(out.contains(">alpha<"));
    }

    #[test]
    fn test_equal_text_is_not_rewritten() {
        let xml = body("<w:p><w:r><w:t>same</w:t></w:r></w:p>");
        let revisions = one(Revision::accepted(1, "same", "same"));
        let (out, applied) = rewrite_document(&xml, &revisions, &Mode::Clean).unwrap();
        assert!(applied.is_empty());
        assert_eq!(out, xml);
    }

    #[test]
    fn test_table_cell_ids_match_parser_walk() {
        let xml = body(
            "<w:p><w:r><w:t>top</w:t></w:r></w:p>\
             <w:tbl><w:tr>\
             <w:tc><w:p><w:r><w:t>cell one</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>cell two</w:t></w:r></w:p></w:tc>\
             </w:tr></w:tbl>",
        );
        // Paragraph 3 is the second cell
        let revisions = one(Revision::accepted(3, "cell two", "revised cell"));
        let (out, applied) = rewrite_document(&xml, &revisions, &Mode::Clean).unwrap();

        assert_eq!(applied.len(), 1);
        assert!(out.contains("cell one"));
        assert!(out.contains("revised cell"));
        assert!(!out.contains("cell two"));
    }

    #[test]
    fn test_nested_table_paragraphs_not_counted() {
        let xml = body(
            "<w:tbl><w:tr><w:tc>\
             <w:p><w:r><w:t>outer</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             </w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>after</w:t></w:r></w:p>",
        );
        // Ids: 1 = outer cell paragraph, 2 = trailing paragraph
        let revisions = one(Revision::accepted(2, "after", "after, revised"));
        let (out, applied) = rewrite_document(&xml, &revisions, &Mode::Clean).unwrap();

        assert_eq!(applied.len(), 1);
        assert!(out.contains("inner"));
        assert!(out.contains("after, revised"));
    }

    #[test]
    fn test_tracked_markup_attribution() {
        let xml = body("<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>The deposit is refundable.</w:t></w:r></w:p>");
        let revisions = one(Revision::accepted(
            1,
            "The deposit is refundable.",
            "The deposit is not refundable.",
        ));
        let mode = Mode::Tracked {
            author: "Reviewer",
            date: "2024-03-01T09:30:00Z",
        };
        let (out, applied) = rewrite_document(&xml, &revisions, &mode).unwrap();

        assert_eq!(applied.len(), 1);
        assert!(out.contains("<w:ins w:id="));
        assert!(out.contains("w:author=\"Reviewer\""));
        assert!(out.contains("w:date=\"2024-03-01T09:30:00Z\""));
        assert!(out.contains("not "));
        // Every run inherits the first run's formatting
        assert!(out.matches("<w:rPr><w:b/></w:rPr>").count() >= 2);
    }

    #[test]
    fn test_tracked_deletion_keeps_original_in_deltext() {
        let xml = body("<w:p><w:r><w:t>keep and drop this</w:t></w:r></w:p>");
        let revisions = one(Revision::accepted(1, "keep and drop this", "keep"));
        let mode = Mode::Tracked {
            author: "Reviewer",
            date: "2024-03-01T09:30:00Z",
        };
        let (out, _) = rewrite_document(&xml, &revisions, &mode).unwrap();

        assert!(out.contains("<w:del w:id="));
        assert!(out.contains("<w:delText xml:space=\"preserve\">"));
        assert!(out.contains("drop this"));
    }

    #[test]
    fn test_empty_paragraph_replacement() {
        let xml = body("<w:p/>");
        let revisions = one(Revision::accepted(1, "", "inserted text"));
        let (out, applied) = rewrite_document(&xml, &revisions, &Mode::Clean).unwrap();

        assert_eq!(applied.len(), 1);
        assert!(out.contains("<w:p><w:r><w:t xml:space=\"preserve\">inserted text</w:t></w:r></w:p>"));
    }

    #[test]
    fn test_text_escaping() {
        let xml = body("<w:p><w:r><w:t>plain</w:t></w:r></w:p>");
        let revisions = one(Revision::accepted(1, "plain", "less < more & \"quoted\""));
        let (out, _) = rewrite_document(&xml, &revisions, &Mode::Clean).unwrap();
        assert!(out.contains("less &lt; more &amp; \"quoted\""));
    }

    #[test]
    fn test_tabs_become_elements() {
        let xml = body("<w:p><w:r><w:t>plain</w:t></w:r></w:p>");
        let revisions = one(Revision::accepted(1, "plain", "col one\tcol two"));
        let (out, _) = rewrite_document(&xml, &revisions, &Mode::Clean).unwrap();
        assert!(out.contains("col one</w:t><w:tab/><w:t xml:space=\"preserve\">col two"));
    }

    #[test]
    fn test_noop_rewrite_is_identity() {
        let xml = body("<w:p><w:r><w:t>untouched</w:t></w:r></w:p>");
        let (out, applied) = rewrite_document(&xml, &RevisionSet::new(), &Mode::Clean).unwrap();
        assert!(applied.is_empty());
        assert_eq!(out, xml);
    }
}
