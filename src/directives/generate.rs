//! Artifact generation from extracted directives.
//!
//! Dispatches resolved conversion requests and then each content block to
//! the encoder collaborator. Every call is isolated: a failed encode is
//! logged and yields nothing for that directive only; unrelated directives
//! are unaffected.

use crate::encoders::ArtifactEncoder;
use crate::types::{Artifact, Directive, FileKind, SourceAttachment};

use super::convert::ResolvedConversion;

/// Content length (chars) above which a DOCX block is better served by
/// converting the real PDF source than by rebuilding a document from
/// model-authored text, which has already lost the source's true layout.
const DOCX_CONVERSION_MIN_CHARS: usize = 100;

/// Produce artifacts for every resolved conversion and directive, in that
/// order. Never fails; a failure yields no artifact for that entry only.
pub fn generate_artifacts(
    directives: &[Directive],
    conversions: &[ResolvedConversion<'_>],
    attachments: &[SourceAttachment],
    encoder: &dyn ArtifactEncoder,
) -> Vec<Artifact> {
    let mut artifacts = Vec::new();

    for conversion in conversions {
        match encoder.pdf_to_docx(conversion.source, &conversion.output_name) {
            Ok(artifact) => {
                log::info!(
                    "generate: converted '{}' -> '{}'",
                    conversion.source.name,
                    artifact.filename
                );
                artifacts.push(artifact);
            }
            Err(e) => log::warn!(
                "generate: conversion of '{}' to '{}' produced no artifact: {}",
                conversion.source.name,
                conversion.output_name,
                e
            ),
        }
    }

    for directive in directives {
        if let Some(artifact) = generate_one(directive, attachments, encoder) {
            artifacts.push(artifact);
        }
    }

    artifacts
}

fn generate_one(
    directive: &Directive,
    attachments: &[SourceAttachment],
    encoder: &dyn ArtifactEncoder,
) -> Option<Artifact> {
    let result = match directive.kind {
        FileKind::Txt => encoder.text_file(&directive.content, &directive.name),
        FileKind::Md => encoder.markdown_file(&directive.content, &directive.name),
        FileKind::Csv => encoder.csv_file(&directive.content, &directive.name),
        FileKind::Pdf => encoder.pdf_report(&directive.content, &directive.name),
        FileKind::Docx => return generate_docx(directive, attachments, encoder),
        FileKind::Xlsx => {
            let rows = parse_table(&directive.content);
            if rows.is_empty() {
                log::debug!("generate: spreadsheet '{}' has no rows, skipped", directive.name);
                return None;
            }
            encoder.spreadsheet(&rows, &directive.name)
        }
        FileKind::Chart => match serde_json::from_str::<serde_json::Value>(&directive.content) {
            Ok(config) => encoder.chart_image(&config, &directive.name),
            Err(e) => {
                log::warn!(
                    "generate: chart config for '{}' failed to parse, block skipped: {}",
                    directive.name,
                    e
                );
                return None;
            }
        },
    };

    finish(directive, result)
}

/// DOCX blocks prefer structural conversion of a real PDF source when one is
/// available and the block carries substantial content. One artifact per
/// block either way; a failed conversion falls back to the text encoder.
fn generate_docx(
    directive: &Directive,
    attachments: &[SourceAttachment],
    encoder: &dyn ArtifactEncoder,
) -> Option<Artifact> {
    if directive.content.chars().count() > DOCX_CONVERSION_MIN_CHARS {
        if let Some(pdf) = attachments.iter().find(|a| a.is_pdf()) {
            match encoder.pdf_to_docx(pdf, &directive.name) {
                Ok(artifact) => {
                    log::info!(
                        "generate: docx '{}' via structural conversion of '{}'",
                        artifact.filename,
                        pdf.name
                    );
                    return Some(artifact);
                }
                Err(e) => log::warn!(
                    "generate: structural conversion of '{}' failed, rebuilding from text: {}",
                    pdf.name,
                    e
                ),
            }
        }
    }

    finish(
        directive,
        encoder.word_document(&directive.content, &directive.name),
    )
}

fn finish(
    directive: &Directive,
    result: Result<Artifact, crate::encoders::EncodeError>,
) -> Option<Artifact> {
    match result {
        Ok(artifact) => {
            log::info!("generate: {} '{}'", directive.kind.label(), artifact.filename);
            Some(artifact)
        }
        Err(e) => {
            log::warn!(
                "generate: {} '{}' produced no artifact: {}",
                directive.kind.label(),
                directive.name,
                e
            );
            None
        }
    }
}

/// Split spreadsheet payload into trimmed cells: rows on line breaks (blank
/// lines dropped), columns on literal `|`.
pub(crate) fn parse_table(content: &str) -> Vec<Vec<String>> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split('|').map(|cell| cell.trim().to_string()).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::testing::StubEncoder;
    use crate::types::Provenance;

    fn directive(kind: FileKind, name: &str, content: &str) -> Directive {
        Directive {
            kind,
            name: name.to_string(),
            content: content.to_string(),
            complete: true,
        }
    }

    fn pdf_attachment() -> SourceAttachment {
        SourceAttachment::new("source.pdf", vec![0x25, 0x50, 0x44, 0x46])
    }

    #[test]
    fn test_parse_table_trims_and_drops_blanks() {
        let rows = parse_table("A | B \n\n 1|2 \n");
        assert_eq!(rows, vec![vec!["A", "B"], vec!["1", "2"]]);
    }

    #[test]
    fn test_failure_is_isolated_to_one_directive() {
        let directives = vec![
            directive(FileKind::Chart, "good_one", r#"{"type":"bar"}"#),
            directive(FileKind::Chart, "bad_json", "{type: bar"),
            directive(FileKind::Chart, "good_two", r#"{"type":"line"}"#),
        ];
        let encoder = StubEncoder::default();
        let artifacts = generate_artifacts(&directives, &[], &[], &encoder);
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].filename, "good_one.png");
        assert_eq!(artifacts[1].filename, "good_two.png");
    }

    #[test]
    fn test_encoder_error_does_not_halt_the_run() {
        let directives = vec![
            directive(FileKind::Txt, "will_fail", "content"),
            directive(FileKind::Txt, "survives", "content"),
        ];
        let encoder = StubEncoder {
            fail_name_containing: Some("will_fail"),
            ..Default::default()
        };
        let artifacts = generate_artifacts(&directives, &[], &[], &encoder);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].filename, "survives.txt");
    }

    #[test]
    fn test_docx_prefers_conversion_when_pdf_present() {
        let long_content = "c".repeat(150);
        let directives = vec![directive(FileKind::Docx, "proposal", &long_content)];
        let attachments = vec![pdf_attachment()];
        let encoder = StubEncoder::default();
        let artifacts = generate_artifacts(&directives, &[], &attachments, &encoder);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].provenance, Provenance::Converted);
    }

    #[test]
    fn test_short_docx_block_is_rebuilt_from_text() {
        let directives = vec![directive(FileKind::Docx, "note", "short body")];
        let attachments = vec![pdf_attachment()];
        let encoder = StubEncoder::default();
        let artifacts = generate_artifacts(&directives, &[], &attachments, &encoder);
        assert_eq!(artifacts[0].provenance, Provenance::Generated);
    }

    #[test]
    fn test_docx_falls_back_to_text_when_conversion_fails() {
        let long_content = "c".repeat(150);
        let directives = vec![directive(FileKind::Docx, "proposal", &long_content)];
        let attachments = vec![pdf_attachment()];
        let encoder = StubEncoder {
            fail_conversion: true,
            ..Default::default()
        };
        let artifacts = generate_artifacts(&directives, &[], &attachments, &encoder);
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].provenance, Provenance::Generated);
    }

    #[test]
    fn test_each_docx_block_converts_independently() {
        let long_content = "c".repeat(150);
        let directives = vec![
            directive(FileKind::Docx, "one", &long_content),
            directive(FileKind::Docx, "two", &long_content),
        ];
        let attachments = vec![pdf_attachment()];
        let encoder = StubEncoder::default();
        let artifacts = generate_artifacts(&directives, &[], &attachments, &encoder);
        assert_eq!(artifacts.len(), 2);
        assert!(artifacts.iter().all(|a| a.provenance == Provenance::Converted));
    }

    #[test]
    fn test_conversions_come_before_content_blocks() {
        let attachments = vec![pdf_attachment()];
        let conversions = vec![super::super::convert::ResolvedConversion {
            output_name: "converted_first".to_string(),
            source: &attachments[0],
        }];
        let directives = vec![directive(FileKind::Txt, "note", "body")];
        let encoder = StubEncoder::default();
        let artifacts = generate_artifacts(&directives, &conversions, &attachments, &encoder);
        assert_eq!(artifacts[0].filename, "converted_first.docx");
        assert_eq!(artifacts[1].filename, "note.txt");
    }

    #[test]
    fn test_empty_spreadsheet_is_skipped() {
        let directives = vec![directive(FileKind::Xlsx, "empty", "\n  \n")];
        let encoder = StubEncoder::default();
        assert!(generate_artifacts(&directives, &[], &[], &encoder).is_empty());
    }
}
