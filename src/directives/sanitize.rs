//! Marker stripping for the user-facing message.
//!
//! Complete directive spans go first (create-markers, content blocks,
//! conversion markers), then any unterminated span from a lone START marker
//! through end of text. Leftover blank-line runs collapse to one blank line.
//! Idempotent: sanitizing sanitized text changes nothing.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::FileKind;

struct SanitizePatterns {
    complete: Vec<Regex>,
    unterminated: Vec<Regex>,
}

fn patterns() -> &'static SanitizePatterns {
    static PATTERNS: OnceLock<SanitizePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let mut complete = Vec::new();
        for kind in FileKind::ALL {
            complete.push(Regex::new(&format!(r"\[CREATE_{}:[^\]]+\]", kind.tag())).unwrap());
            complete.push(
                Regex::new(&format!(
                    r"(?s)\[{}\].*?\[{}\]",
                    regex::escape(kind.content_start()),
                    regex::escape(kind.content_end())
                ))
                .unwrap(),
            );
        }
        complete.push(Regex::new(r"\[CONVERT_PDF_TO_DOCX:[^\]]+\]").unwrap());
        complete.push(Regex::new(r"\[PDF_SOURCE:[^\]]+\]").unwrap());

        let unterminated = FileKind::ALL
            .iter()
            .map(|kind| {
                Regex::new(&format!(
                    r"(?s)\[{}\].*$",
                    regex::escape(kind.content_start())
                ))
                .unwrap()
            })
            .collect();

        SanitizePatterns {
            complete,
            unterminated,
        }
    })
}

fn re_blank_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

/// Strip every directive marker from the reply text.
pub fn strip_file_markers(text: &str) -> String {
    let mut cleaned = text.to_string();

    for re in &patterns().complete {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    for re in &patterns().unterminated {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }

    let cleaned = re_blank_runs().replace_all(&cleaned, "\n\n");
    cleaned.trim().to_string()
}
