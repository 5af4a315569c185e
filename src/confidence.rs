//! Confidence self-assessment parsing.
//!
//! The system prompt asks the model to end its reply with a
//! `CONFIDENCE: NN%` line. Absent or unparsable scores are simply `None`.

use std::sync::OnceLock;

use regex::Regex;

fn re_confidence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)CONFIDENCE:\s*(\d+)%").unwrap())
}

/// Parse the first confidence score in the reply, if any.
pub fn extract_confidence(text: &str) -> Option<u8> {
    re_confidence()
        .captures(text)
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .filter(|score| *score <= 100)
}
