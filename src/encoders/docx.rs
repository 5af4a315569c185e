//! Minimal WordprocessingML writer and PDF→DOCX structural conversion.
//!
//! A .docx is a ZIP package whose text body lives in `word/document.xml` as
//! `<w:p><w:r><w:t>` runs; this module emits that structure in its simplest
//! valid form, one paragraph per input line. Conversion re-packages the text
//! layer of a real PDF source instead of whatever the model transcribed.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::types::{Artifact, FileKind, SourceAttachment};

use super::EncodeError;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Build a Word document from model-authored text.
pub(crate) fn from_text(content: &str, name: &str) -> Result<Artifact, EncodeError> {
    let bytes = package(content)?;
    Ok(Artifact::generated(FileKind::Docx, name, bytes))
}

/// Convert a PDF source attachment by re-packaging its text layer.
pub(crate) fn from_pdf(source: &SourceAttachment, name: &str) -> Result<Artifact, EncodeError> {
    let text = extract_pdf_text(source)?;
    let bytes = package(&text)?;
    Ok(Artifact::converted(FileKind::Docx, name, bytes))
}

/// Pull the text layer out of the PDF bytes. The extractor can panic on
/// malformed input, so the call runs behind a panic boundary.
fn extract_pdf_text(source: &SourceAttachment) -> Result<String, EncodeError> {
    let data = source.data.clone();
    let outcome = std::panic::catch_unwind(move || pdf_extract::extract_text_from_mem(&data));

    match outcome {
        Ok(Ok(text)) if !text.trim().is_empty() => Ok(text),
        Ok(Ok(_)) => Err(EncodeError::NoTextLayer(source.name.clone())),
        Ok(Err(e)) => Err(EncodeError::PdfExtract(e.to_string())),
        Err(_) => Err(EncodeError::ExtractionPanicked(source.name.clone())),
    }
}

fn package(content: &str) -> Result<Vec<u8>, EncodeError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("word/document.xml", options)?;
    let document = document_xml(content)?;
    zip.write_all(&document)?;

    Ok(zip.finish()?.into_inner())
}

fn document_xml(content: &str) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut document = BytesStart::new("w:document");
    document.push_attribute(("xmlns:w", WORD_NS));
    writer.write_event(Event::Start(document))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    for line in content.lines() {
        writer.write_event(Event::Start(BytesStart::new("w:p")))?;
        if !line.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("w:r")))?;
            let mut text = BytesStart::new("w:t");
            text.push_attribute(("xml:space", "preserve"));
            writer.write_event(Event::Start(text))?;
            writer.write_event(Event::Text(BytesText::new(line)))?;
            writer.write_event(Event::End(BytesEnd::new("w:t")))?;
            writer.write_event(Event::End(BytesEnd::new("w:r")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;
    Ok(writer.into_inner())
}
