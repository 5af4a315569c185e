//! Directive extraction from raw model reply text.
//!
//! Per file kind: collect `[CREATE_<TYPE>:name]` marker names and complete
//! `START...END` content blocks, then pair them positionally. When a reply
//! was cut off mid-stream the closing marker never arrives; a recovery pass
//! salvages the unterminated block if enough content survived after
//! stripping trailing marker junk.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{Directive, FileKind};

/// Minimum surviving content length (in characters, post-trim) for a
/// truncation-recovered block to be kept.
const MIN_RECOVERED_CHARS: usize = 50;

struct KindPatterns {
    /// `[CREATE_<TYPE>:name]`
    create: Regex,
    /// Complete `START...END` span, non-greedy, across line breaks.
    block: Regex,
    /// Unterminated `START` through end of text.
    open: Regex,
}

fn kind_patterns(kind: FileKind) -> &'static KindPatterns {
    static PATTERNS: OnceLock<Vec<KindPatterns>> = OnceLock::new();
    let all = PATTERNS.get_or_init(|| {
        FileKind::ALL
            .iter()
            .map(|k| KindPatterns {
                create: Regex::new(&format!(r"\[CREATE_{}:([^\]]+)\]", k.tag())).unwrap(),
                block: Regex::new(&format!(
                    r"(?s)\[{}\](.*?)\[{}\]",
                    regex::escape(k.content_start()),
                    regex::escape(k.content_end())
                ))
                .unwrap(),
                open: Regex::new(&format!(r"(?s)\[{}\](.*)$", regex::escape(k.content_start())))
                    .unwrap(),
            })
            .collect()
    });
    &all[kind as usize]
}

/// Trailing marker-like junk in recovered content: a stray content tag (and
/// anything after it), or a long `=====` divider run through end of text.
fn re_trailing_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[/?\w+_(?:CONTENT|DATA|CONFIG)_\w*\].*$").unwrap())
}

fn re_divider_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)={5,}.*$").unwrap())
}

/// Extract all directives for every supported kind, in registry order.
///
/// Never fails; text without markers yields an empty list.
pub fn scan_all(text: &str) -> Vec<Directive> {
    FileKind::ALL
        .iter()
        .flat_map(|kind| scan_kind(text, *kind))
        .collect()
}

/// Extract the directives of one kind.
pub fn scan_kind(text: &str, kind: FileKind) -> Vec<Directive> {
    let patterns = kind_patterns(kind);

    let names: Vec<String> = patterns
        .create
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect();

    let blocks: Vec<String> = patterns
        .block
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect();

    if !blocks.is_empty() {
        return pair_names_with_blocks(kind, &names, blocks);
    }

    recover_unterminated(text, kind, &names)
        .map(|directive| vec![directive])
        .unwrap_or_default()
}

/// Positional pairing: the i-th name goes with the i-th block; blocks beyond
/// the name count get the kind's positional default name; extra names are
/// ignored. Pure function of the two ordered lists.
pub(crate) fn pair_names_with_blocks(
    kind: FileKind,
    names: &[String],
    blocks: Vec<String>,
) -> Vec<Directive> {
    blocks
        .into_iter()
        .enumerate()
        .map(|(index, content)| Directive {
            kind,
            name: names
                .get(index)
                .cloned()
                .unwrap_or_else(|| kind.default_name(index)),
            content,
            complete: true,
        })
        .collect()
}

/// Salvage a single unterminated block: take everything after the lone START
/// marker, strip trailing marker junk, and keep it only when enough content
/// survived. Recovered directives carry `complete = false`.
fn recover_unterminated(text: &str, kind: FileKind, names: &[String]) -> Option<Directive> {
    let caps = kind_patterns(kind).open.captures(text)?;
    let mut content = caps[1].trim().to_string();

    content = re_trailing_tag().replace(&content, "").trim().to_string();
    content = re_divider_run().replace(&content, "").trim().to_string();

    let survived = content.chars().count();
    if survived <= MIN_RECOVERED_CHARS {
        log::debug!(
            "scanner: unterminated {} block too short to recover ({} chars), dropped",
            kind.label(),
            survived
        );
        return None;
    }

    let name = names
        .first()
        .cloned()
        .unwrap_or_else(|| kind.fallback_name());
    log::info!(
        "scanner: recovered unterminated {} block as '{}' ({} chars)",
        kind.label(),
        name,
        survived
    );

    Some(Directive {
        kind,
        name,
        content,
        complete: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_round_trip() {
        let text = "[CREATE_TXT:report]\n[TXT_CONTENT_START]\nHello\n[TXT_CONTENT_END]";
        let directives = scan_kind(text, FileKind::Txt);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].name, "report");
        assert_eq!(directives[0].content, "Hello");
        assert!(directives[0].complete);
    }

    #[test]
    fn test_block_without_marker_gets_default_name() {
        let text = "[CSV_CONTENT_START]\na,b\n1,2\n[CSV_CONTENT_END]";
        let directives = scan_kind(text, FileKind::Csv);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].name, "file_1");
    }

    #[test]
    fn test_excess_block_gets_positional_default() {
        let text = "[CREATE_MD:first]\n\
                    [MD_CONTENT_START]\n# One\n[MD_CONTENT_END]\n\
                    [MD_CONTENT_START]\n# Two\n[MD_CONTENT_END]";
        let directives = scan_kind(text, FileKind::Md);
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].name, "first");
        assert_eq!(directives[1].name, "file_2");
    }

    #[test]
    fn test_excess_names_are_ignored() {
        let text = "[CREATE_TXT:a]\n[CREATE_TXT:b]\n\
                    [TXT_CONTENT_START]\nonly one block\n[TXT_CONTENT_END]";
        let directives = scan_kind(text, FileKind::Txt);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].name, "a");
    }

    #[test]
    fn test_spreadsheet_uses_its_own_default_name() {
        let text = "[XLSX_DATA_START]\nA|B\n1|2\n[XLSX_DATA_END]";
        let directives = scan_kind(text, FileKind::Xlsx);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].name, "spreadsheet_1");
    }

    #[test]
    fn test_truncation_recovery_keeps_long_tail() {
        let tail = "x".repeat(80);
        let text = format!("Here is the document.\n[PDF_CONTENT_START]\n{}", tail);
        let directives = scan_kind(&text, FileKind::Pdf);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].content, tail);
        assert_eq!(directives[0].name, "pdf_fallback");
        assert!(!directives[0].complete);
    }

    #[test]
    fn test_truncation_recovery_drops_short_tail() {
        let text = format!("Cut off.\n[PDF_CONTENT_START]\n{}", "x".repeat(20));
        assert!(scan_kind(&text, FileKind::Pdf).is_empty());
    }

    #[test]
    fn test_recovery_uses_marker_name_when_present() {
        let text = format!(
            "[CREATE_DOCX:proposal]\n[DOCX_CONTENT_START]\n{}",
            "content ".repeat(20)
        );
        let directives = scan_kind(&text, FileKind::Docx);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].name, "proposal");
    }

    #[test]
    fn test_recovery_strips_trailing_junk() {
        let body = "line of real content ".repeat(5);
        let text = format!(
            "[TXT_CONTENT_START]\n{}\n[MD_CONTENT_END]\n==========\nleftover",
            body
        );
        let directives = scan_kind(&text, FileKind::Txt);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].content, body.trim());
    }

    #[test]
    fn test_divider_run_is_stripped() {
        let body = "recovered content that is clearly long enough to keep around";
        let text = format!("[MD_CONTENT_START]\n{}\n=======\nsignature", body);
        let directives = scan_kind(&text, FileKind::Md);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].content, body);
    }

    #[test]
    fn test_no_markers_yields_empty() {
        assert!(scan_all("Just a friendly reply, no files.").is_empty());
    }

    #[test]
    fn test_kinds_are_scanned_independently() {
        let text = "[CREATE_TXT:notes]\n[TXT_CONTENT_START]\nplain\n[TXT_CONTENT_END]\n\
                    [CREATE_CSV:data]\n[CSV_CONTENT_START]\na,b\n[CSV_CONTENT_END]";
        let directives = scan_all(text);
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].kind, FileKind::Txt);
        assert_eq!(directives[1].kind, FileKind::Csv);
    }

    #[test]
    fn test_pairing_is_pure_over_lists() {
        let names = vec!["alpha".to_string()];
        let blocks = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let directives = pair_names_with_blocks(FileKind::Chart, &names, blocks);
        assert_eq!(directives[0].name, "alpha");
        assert_eq!(directives[1].name, "chart_2");
        assert_eq!(directives[2].name, "chart_3");
    }
}
