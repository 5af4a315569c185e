//! Minimal PDF report writer.
//!
//! Renders the directive text as a paginated Helvetica document, built
//! object-by-object (catalog → pages → page/content streams). Good enough
//! for reports and extracted notes; not a layout engine.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::types::{Artifact, FileKind};

use super::EncodeError;

// A4 portrait, in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 11;
const LEADING: i64 = 14;
/// Conservative fit for 11pt Helvetica inside the margins.
const MAX_LINE_CHARS: usize = 92;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

/// Render the text content as a PDF artifact.
pub(crate) fn render_report(content: &str, name: &str) -> Result<Artifact, EncodeError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let lines = wrap_lines(content);
    let mut kids: Vec<Object> = Vec::new();

    for page_lines in lines.chunks(LINES_PER_PAGE) {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LEADING.into()]),
            Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
        ];
        for line in page_lines {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(line.as_str())],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let encoded = Content { operations }
            .encode()
            .map_err(|e| EncodeError::PdfBuild(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| EncodeError::PdfBuild(e.to_string()))?;

    Ok(Artifact::generated(FileKind::Pdf, name, bytes))
}

/// Word-wrap the content to the page width. Overlong words are hard-split.
/// Always yields at least one line so an empty report still has a page.
fn wrap_lines(content: &str) -> Vec<String> {
    let mut out = Vec::new();

    for raw in content.lines() {
        let raw = raw.trim_end();
        if raw.is_empty() {
            out.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in raw.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();

            if current_len + usize::from(!current.is_empty()) + word_len <= MAX_LINE_CHARS {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                continue;
            }

            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }

            if word_len <= MAX_LINE_CHARS {
                current.push_str(word);
            } else {
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(MAX_LINE_CHARS) {
                    out.push(chunk.iter().collect());
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }

    if out.is_empty() {
        out.push(String::new());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_a_pdf() {
        let artifact = render_report("Quarterly summary.\nAll numbers nominal.", "q_report")
            .unwrap();
        assert_eq!(artifact.filename, "q_report.pdf");
        assert!(artifact.data.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_content_still_produces_a_document() {
        let artifact = render_report("", "blank").unwrap();
        assert!(artifact.data.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_content_spans_multiple_pages() {
        let content = "A line of report text.\n".repeat(LINES_PER_PAGE * 2);
        let artifact = render_report(&content, "long").unwrap();
        let doc = lopdf::Document::load_mem(&artifact.data).unwrap();
        assert!(doc.get_pages().len() >= 2);
    }

    #[test]
    fn test_wrap_preserves_blank_lines() {
        let lines = wrap_lines("one\n\ntwo");
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_wrap_splits_long_lines_on_words() {
        let lines = wrap_lines(&"word ".repeat(40));
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= MAX_LINE_CHARS));
    }

    #[test]
    fn test_wrap_hard_splits_unbreakable_runs() {
        let lines = wrap_lines(&"x".repeat(MAX_LINE_CHARS * 2 + 10));
        assert_eq!(lines.len(), 3);
    }
}
