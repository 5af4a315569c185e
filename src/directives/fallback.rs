//! Last-resort PDF conversion when the reply announces a document in prose.
//!
//! Some replies promise an attachment ("I've attached the converted
//! document", "Я создал документ") without emitting any machine-readable
//! directive. When nothing else produced an artifact and a PDF source is
//! available, keyword signals trigger an automatic conversion of that PDF.

use std::sync::OnceLock;

use regex::Regex;

use crate::encoders::ArtifactEncoder;
use crate::types::{Artifact, SourceAttachment};

/// Word-boundary signals for scripts where `\b` is reliable.
fn re_latin_signals() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(docx|word|document|attached|file)\b").unwrap())
}

/// Substring lexicon for scripts where word boundaries are not well-defined
/// (`\b` is ASCII-oriented and misfires on Cyrillic). Stems rather than full
/// words so inflected forms match: "прикреп" covers "прикрепил",
/// "прикреплённый", and so on.
const CYRILLIC_LEXICON: &[&str] = &[
    "документ", "конверт", "прикреп", "вложен", "создал", "формат", "файл",
];

/// Residual directive fragments: a broken marker still signals intent.
const MARKER_SIGNALS: &[&str] = &["[CREATE_DOCX:", "[DOCX_CONTENT_START]"];

/// Does the reply text suggest the model meant to deliver a document?
pub fn wants_document(text: &str) -> bool {
    if re_latin_signals().is_match(text) {
        return true;
    }
    if MARKER_SIGNALS.iter().any(|marker| text.contains(marker)) {
        return true;
    }
    let lower = text.to_lowercase();
    CYRILLIC_LEXICON.iter().any(|stem| lower.contains(stem))
}

/// Convert the first PDF attachment when intent signals fire. Called only
/// after the generator produced nothing; returns at most one artifact.
pub fn auto_convert(
    text: &str,
    attachments: &[SourceAttachment],
    encoder: &dyn ArtifactEncoder,
) -> Option<Artifact> {
    let pdf = attachments.iter().find(|a| a.is_pdf())?;
    if !wants_document(text) {
        return None;
    }

    let name = derived_name(&pdf.name);
    log::info!(
        "fallback: no artifacts but document intent detected, converting '{}' as '{}'",
        pdf.name,
        name
    );

    match encoder.pdf_to_docx(pdf, &name) {
        Ok(artifact) => Some(artifact),
        Err(e) => {
            log::warn!("fallback: conversion of '{}' failed: {}", pdf.name, e);
            None
        }
    }
}

/// `Report.pdf` → `Report_converted` (extension replaced, not appended).
fn derived_name(source: &str) -> String {
    let bytes = source.as_bytes();
    let stem = if bytes.len() >= 4
        && source.is_char_boundary(bytes.len() - 4)
        && source[bytes.len() - 4..].eq_ignore_ascii_case(".pdf")
    {
        &source[..bytes.len() - 4]
    } else {
        source
    };
    format!("{}_converted", stem)
}
