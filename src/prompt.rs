//! System prompt assembly for the reply model.
//!
//! The marker grammar the scanner parses is the same grammar taught here, so
//! the instruction blocks are generated from the [`FileKind`] registry rather
//! than hand-written per type. The network call itself belongs to the caller;
//! this module only produces the prompt string.

use crate::types::{FileKind, SourceAttachment};

/// Inputs for one prompt build.
pub struct PromptInputs<'a> {
    /// Display name of the person the assistant replies on behalf of.
    pub owner_name: &'a str,
    pub agent_name: &'a str,
    /// Combined knowledge text (see [`combined_knowledge`]).
    pub knowledge: &'a str,
    /// Historical thread context retrieved by the caller.
    pub history: &'a str,
    pub attachments: &'a [SourceAttachment],
}

/// Merge personal rules over the shared knowledge base. Personal rules win
/// on conflict, so they go first and are labeled as the priority block.
pub fn combined_knowledge(personal: Option<&str>, global: &str) -> String {
    match personal.map(str::trim).filter(|p| !p.is_empty()) {
        Some(personal) => format!(
            "PERSONAL RULES (Priority):\n{}\n\nGLOBAL RULES:\n{}",
            personal, global
        ),
        None => global.to_string(),
    }
}

/// Best-effort display name from an email address:
/// `sarah.chen@acme.com` → `Sarah Chen`.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let name = local
        .split(|c: char| c == '.' || c == '_' || c == '-' || c == '+')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        "User".to_string()
    } else {
        name
    }
}

/// Build the full system prompt for one incoming email.
pub fn build_system_prompt(inputs: &PromptInputs<'_>) -> String {
    let has_attachments = !inputs.attachments.is_empty();
    let has_pdf = inputs.attachments.iter().any(|a| a.is_pdf());
    let today = chrono::Local::now().format("%Y-%m-%d");

    let mut prompt = format!(
        "SYSTEM INSTRUCTIONS:\nYou are {agent}, a professional email assistant for {owner}.\nToday's date: {today}\n\n",
        agent = inputs.agent_name,
        owner = inputs.owner_name,
    );

    if has_attachments {
        prompt.push_str(
            "The email includes attached files. Analyze them carefully and reference \
             specific details in your response.\n\n",
        );
    } else {
        prompt.push_str(
            "If instructions or notes are provided, translate and refine them into a \
             professional email draft.\n\n",
        );
    }

    prompt.push_str(&section("KNOWLEDGE BASE / STRATEGIC RULES", inputs.knowledge));
    prompt.push_str(&section("HISTORICAL CONTEXT", inputs.history));

    if has_attachments {
        prompt.push_str(&section(
            "ATTACHED FILES",
            &attachment_context(inputs.attachments),
        ));
    }

    prompt.push_str(&section("FILE CREATION CAPABILITY", &creation_grammar()));

    if has_pdf {
        prompt.push_str(&section("PDF TO DOCX CONVERSION", &conversion_grammar()));
    }

    prompt.push_str(
        "CRITICAL FILE CREATION RULES:\n\
         1. Always emit all three markers: the CREATE marker, the START marker, and the END marker.\n\
         2. A content block without its CREATE marker gets a generic filename.\n\
         3. A content block without its END marker may be discarded entirely.\n\
         4. Place file markers after your main response text.\n\
         5. Filenames: descriptive, no spaces, no extension (it is added for you).\n\
         6. For long documents include the complete content; never truncate.\n\n",
    );

    prompt.push_str(
        "Mirror the sender's language and professional tone. End your reply with a line \
         `CONFIDENCE: NN%` rating how confident you are in the draft.\n",
    );

    prompt
}

fn section(title: &str, body: &str) -> String {
    format!(
        "=========================================\n{}:\n{}\n=========================================\n\n",
        title,
        body.trim_end()
    )
}

/// One instruction block per supported kind, generated from the registry.
fn creation_grammar() -> String {
    let mut out = String::from("Create files using this exact marker format:\n\n");
    for kind in FileKind::ALL {
        out.push_str(&format!(
            "**{} ({}):**\n[CREATE_{}:filename_without_extension]\n[{}]\n{}\n[{}]\n\n",
            kind.label(),
            kind.mime(),
            kind.tag(),
            kind.content_start(),
            sample_payload(kind),
            kind.content_end(),
        ));
    }
    out
}

fn conversion_grammar() -> String {
    "When asked to convert an attached PDF to an editable Word document, emit:\n\n\
     [CONVERT_PDF_TO_DOCX:output_filename_without_extension]\n\
     [PDF_SOURCE:original_filename.pdf]\n\n\
     Use the exact original PDF filename from the attachments, or `*` for the \
     first attached PDF."
        .to_string()
}

fn sample_payload(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Txt => "Content here",
        FileKind::Md => "# Heading\n\nBody text",
        FileKind::Csv => "Header1,Header2\nValue1,Value2",
        FileKind::Pdf => "Content for the PDF report",
        FileKind::Docx => "Content for the Word document",
        FileKind::Xlsx => "Header1|Header2\nRow1Col1|Row1Col2",
        FileKind::Chart => r#"{"type":"bar","data":{"labels":["Q1","Q2"],"datasets":[{"label":"Revenue","data":[50,65]}]}}"#,
    }
}

fn attachment_context(attachments: &[SourceAttachment]) -> String {
    attachments
        .iter()
        .map(|a| format!("- {} ({}, {} bytes)", a.name, a.kind.label(), a.data.len()))
        .collect::<Vec<_>>()
        .join("\n")
}
