//! PDF conversion request extraction and source resolution.
//!
//! `[CONVERT_PDF_TO_DOCX:<output>]` markers pair positionally with
//! `[PDF_SOURCE:<name>]` markers. A missing source list (or a literal `*`)
//! means "first available PDF attachment". Requests whose source cannot be
//! matched are dropped and logged, never fatal.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{ConversionRequest, SourceAttachment, SourceRef};

fn re_convert() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[CONVERT_PDF_TO_DOCX:([^\]]+)\]").unwrap())
}

fn re_source() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[PDF_SOURCE:([^\]]+)\]").unwrap())
}

/// A conversion request whose source reference matched an attachment.
#[derive(Debug)]
pub struct ResolvedConversion<'a> {
    pub output_name: String,
    pub source: &'a SourceAttachment,
}

/// Collect conversion requests from the reply text.
///
/// Output and source markers pair index-wise up to the shorter count. When
/// output markers exist with no source markers at all, each output gets a
/// wildcard source.
pub fn extract_requests(text: &str) -> Vec<ConversionRequest> {
    let outputs: Vec<String> = re_convert()
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect();

    if outputs.is_empty() {
        return Vec::new();
    }

    let sources: Vec<SourceRef> = re_source()
        .captures_iter(text)
        .map(|caps| SourceRef::parse(&caps[1]))
        .collect();

    if sources.is_empty() {
        log::info!(
            "convert: {} output marker(s) with no [PDF_SOURCE:], falling back to first available PDF",
            outputs.len()
        );
        return outputs
            .into_iter()
            .map(|output_name| ConversionRequest {
                output_name,
                source: SourceRef::Wildcard,
            })
            .collect();
    }

    let paired = outputs.len().min(sources.len());
    if outputs.len() > paired {
        log::warn!(
            "convert: {} conversion output(s) without a paired source, dropped",
            outputs.len() - paired
        );
    }

    outputs
        .into_iter()
        .zip(sources)
        .map(|(output_name, source)| ConversionRequest { output_name, source })
        .collect()
}

/// Resolve requests against the inbound attachments. Unresolved requests are
/// dropped with a warning.
pub fn resolve<'a>(
    requests: &[ConversionRequest],
    attachments: &'a [SourceAttachment],
) -> Vec<ResolvedConversion<'a>> {
    requests
        .iter()
        .filter_map(|request| match find_source(&request.source, attachments) {
            Some(source) => Some(ResolvedConversion {
                output_name: request.output_name.clone(),
                source,
            }),
            None => {
                log::warn!(
                    "convert: no PDF attachment matches '{}' for output '{}', request dropped",
                    request.source.label(),
                    request.output_name
                );
                None
            }
        })
        .collect()
}

/// Match precedence: exact name (case-insensitive), then name with the
/// trailing `.pdf` stripped from both sides, then, for wildcards, the
/// first PDF attachment in list order.
fn find_source<'a>(
    source: &SourceRef,
    attachments: &'a [SourceAttachment],
) -> Option<&'a SourceAttachment> {
    match source {
        SourceRef::Wildcard => attachments.iter().find(|a| a.is_pdf()),
        SourceRef::Named(name) => {
            let wanted = name.to_lowercase();
            attachments
                .iter()
                .filter(|a| a.is_pdf())
                .find(|a| a.name.to_lowercase() == wanted)
                .or_else(|| {
                    let wanted_stem = strip_pdf_extension(&wanted);
                    attachments.iter().filter(|a| a.is_pdf()).find(|a| {
                        strip_pdf_extension(&a.name.to_lowercase()) == wanted_stem
                    })
                })
        }
    }
}

fn strip_pdf_extension(name: &str) -> String {
    name.strip_suffix(".pdf").unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> SourceAttachment {
        SourceAttachment::new(name, vec![0x25, 0x50, 0x44, 0x46])
    }

    #[test]
    fn test_pairs_up_to_shorter_count() {
        let text = "[CONVERT_PDF_TO_DOCX:first]\n[CONVERT_PDF_TO_DOCX:second]\n\
                    [PDF_SOURCE:report.pdf]";
        let requests = extract_requests(text);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].output_name, "first");
        assert_eq!(requests[0].source, SourceRef::Named("report.pdf".to_string()));
    }

    #[test]
    fn test_missing_sources_become_wildcards() {
        let text = "[CONVERT_PDF_TO_DOCX:a]\n[CONVERT_PDF_TO_DOCX:b]";
        let requests = extract_requests(text);
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.source == SourceRef::Wildcard));
    }

    #[test]
    fn test_literal_star_is_wildcard() {
        let text = "[CONVERT_PDF_TO_DOCX:out]\n[PDF_SOURCE:*]";
        let requests = extract_requests(text);
        assert_eq!(requests[0].source, SourceRef::Wildcard);
    }

    #[test]
    fn test_no_markers_yields_empty() {
        assert!(extract_requests("No conversions requested.").is_empty());
    }

    #[test]
    fn test_wildcard_resolves_to_first_pdf() {
        let attachments = vec![pdf("A.pdf"), pdf("B.pdf")];
        let requests = vec![ConversionRequest {
            output_name: "out".to_string(),
            source: SourceRef::Wildcard,
        }];
        let resolved = resolve(&requests, &attachments);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].source.name, "A.pdf");
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let attachments = vec![pdf("Quarterly.PDF")];
        let requests = vec![ConversionRequest {
            output_name: "out".to_string(),
            source: SourceRef::Named("quarterly.pdf".to_string()),
        }];
        assert_eq!(resolve(&requests, &attachments).len(), 1);
    }

    #[test]
    fn test_extension_stripped_match() {
        let attachments = vec![pdf("Report.PDF")];
        let requests = vec![ConversionRequest {
            output_name: "out".to_string(),
            source: SourceRef::Named("report".to_string()),
        }];
        let resolved = resolve(&requests, &attachments);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].source.name, "Report.PDF");
    }

    #[test]
    fn test_unresolved_request_is_dropped() {
        let attachments = vec![pdf("other.pdf")];
        let requests = vec![
            ConversionRequest {
                output_name: "missing".to_string(),
                source: SourceRef::Named("nowhere.pdf".to_string()),
            },
            ConversionRequest {
                output_name: "found".to_string(),
                source: SourceRef::Named("other".to_string()),
            },
        ];
        let resolved = resolve(&requests, &attachments);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].output_name, "found");
    }

    #[test]
    fn test_non_pdf_attachments_never_match() {
        let attachments = vec![SourceAttachment::new("report.docx", vec![1])];
        let requests = vec![ConversionRequest {
            output_name: "out".to_string(),
            source: SourceRef::Wildcard,
        }];
        assert!(resolve(&requests, &attachments).is_empty());
    }
}
