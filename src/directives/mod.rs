//! Reply post-processing pipeline.
//!
//! Raw model text → scanner → {conversion resolver, content blocks} →
//! generator → (heuristic fallback) → sanitizer. Produces the cleaned
//! message, the model's confidence self-assessment, and the artifact list.
//!
//! Never fails: the worst outcome is an empty artifact list paired with a
//! fully sanitized message. Every drop, recovery, and failure decision is
//! logged instead of raised.

pub mod convert;
pub mod fallback;
pub mod generate;
pub mod sanitize;
pub mod scanner;

use crate::confidence::extract_confidence;
use crate::encoders::ArtifactEncoder;
use crate::types::{ModelReply, SourceAttachment};

/// Process one block of model output against the inbound attachments.
pub fn process_model_output(
    raw: &str,
    attachments: &[SourceAttachment],
    encoder: &dyn ArtifactEncoder,
) -> ModelReply {
    let directives = scanner::scan_all(raw);
    if !directives.is_empty() {
        log::info!("pipeline: {} directive(s) extracted", directives.len());
    }

    let requests = convert::extract_requests(raw);
    let conversions = convert::resolve(&requests, attachments);

    let mut artifacts = generate::generate_artifacts(&directives, &conversions, attachments, encoder);

    if artifacts.is_empty() {
        if let Some(artifact) = fallback::auto_convert(raw, attachments, encoder) {
            artifacts.push(artifact);
        }
    }

    log::info!("pipeline: {} artifact(s) produced", artifacts.len());

    ModelReply {
        text: sanitize::strip_file_markers(raw),
        confidence: extract_confidence(raw),
        artifacts,
    }
}
