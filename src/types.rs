//! Core data model for the reply pipeline.
//!
//! The model embeds file instructions in its reply text as bracketed
//! markers: a `[CREATE_<TYPE>:<name>]` naming marker plus a
//! `[<TYPE>_CONTENT_START]...[<TYPE>_CONTENT_END]` content block. These
//! types describe the supported file kinds and their marker vocabulary, the
//! directives recovered from a reply, the caller-owned inbound attachments,
//! and the artifacts handed back for the outgoing message.

use serde::{Deserialize, Serialize};

/// File kinds the model may ask for, in generation order.
///
/// Each kind owns its marker vocabulary. The spreadsheet kind uses `DATA`
/// markers and the chart kind `CONFIG` markers; everything else uses
/// `CONTENT` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Txt,
    Md,
    Csv,
    Pdf,
    Docx,
    Xlsx,
    Chart,
}

impl FileKind {
    /// Every supported kind, in declaration order.
    pub const ALL: [FileKind; 7] = [
        FileKind::Txt,
        FileKind::Md,
        FileKind::Csv,
        FileKind::Pdf,
        FileKind::Docx,
        FileKind::Xlsx,
        FileKind::Chart,
    ];

    /// Marker tag as it appears after `CREATE_`, e.g. `TXT`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Txt => "TXT",
            Self::Md => "MD",
            Self::Csv => "CSV",
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Xlsx => "XLSX",
            Self::Chart => "CHART",
        }
    }

    /// Opening content marker, without brackets.
    pub fn content_start(&self) -> &'static str {
        match self {
            Self::Txt => "TXT_CONTENT_START",
            Self::Md => "MD_CONTENT_START",
            Self::Csv => "CSV_CONTENT_START",
            Self::Pdf => "PDF_CONTENT_START",
            Self::Docx => "DOCX_CONTENT_START",
            Self::Xlsx => "XLSX_DATA_START",
            Self::Chart => "CHART_CONFIG_START",
        }
    }

    /// Closing content marker, without brackets.
    pub fn content_end(&self) -> &'static str {
        match self {
            Self::Txt => "TXT_CONTENT_END",
            Self::Md => "MD_CONTENT_END",
            Self::Csv => "CSV_CONTENT_END",
            Self::Pdf => "PDF_CONTENT_END",
            Self::Docx => "DOCX_CONTENT_END",
            Self::Xlsx => "XLSX_DATA_END",
            Self::Chart => "CHART_CONFIG_END",
        }
    }

    /// File extension for artifacts of this kind (charts render to PNG).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Md => "md",
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Chart => "png",
        }
    }

    /// MIME type for artifacts of this kind.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Txt => "text/plain",
            Self::Md => "text/markdown",
            Self::Csv => "text/csv",
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Chart => "image/png",
        }
    }

    /// Lowercase label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Txt => "txt",
            Self::Md => "md",
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Xlsx => "xlsx",
            Self::Chart => "chart",
        }
    }

    /// Positional default name for the content block at `index` when there
    /// is no paired create-marker: `file_1`, `spreadsheet_2`, `chart_3`, ...
    pub fn default_name(&self, index: usize) -> String {
        match self {
            Self::Xlsx => format!("spreadsheet_{}", index + 1),
            Self::Chart => format!("chart_{}", index + 1),
            _ => format!("file_{}", index + 1),
        }
    }

    /// Name used for truncation-recovered content with no marker name at all.
    pub fn fallback_name(&self) -> String {
        match self {
            Self::Xlsx => "spreadsheet_fallback".to_string(),
            _ => format!("{}_fallback", self.label()),
        }
    }
}

/// Inbound attachment kinds, detected from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Pdf,
    Image,
    Word,
    Spreadsheet,
    Markdown,
    Csv,
    Text,
    Other,
}

impl AttachmentKind {
    /// Detect the kind from a filename.
    pub fn from_name(name: &str) -> Self {
        let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "png" | "jpg" | "jpeg" | "gif" | "webp" => Self::Image,
            "docx" | "doc" => Self::Word,
            "xlsx" | "xls" | "ods" => Self::Spreadsheet,
            "md" | "markdown" => Self::Markdown,
            "csv" | "tsv" => Self::Csv,
            "txt" | "log" => Self::Text,
            _ => Self::Other,
        }
    }

    /// Human-readable label for prompts and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Image => "image",
            Self::Word => "Word document",
            Self::Spreadsheet => "spreadsheet",
            Self::Markdown => "Markdown",
            Self::Csv => "CSV",
            Self::Text => "text",
            Self::Other => "file",
        }
    }
}

/// A file attached to the inbound message. Owned by the caller and read-only
/// to this subsystem; conversion requests resolve against these.
#[derive(Debug, Clone)]
pub struct SourceAttachment {
    pub name: String,
    pub kind: AttachmentKind,
    pub data: Vec<u8>,
}

impl SourceAttachment {
    /// Build an attachment, detecting the kind from the filename.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let kind = AttachmentKind::from_name(&name);
        Self { name, kind, data }
    }

    pub fn is_pdf(&self) -> bool {
        self.kind == AttachmentKind::Pdf
    }
}

/// A file-creation instruction recovered from the reply text.
///
/// `complete` is false for blocks salvaged by truncation recovery (the
/// closing marker never arrived).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub kind: FileKind,
    pub name: String,
    pub content: String,
    pub complete: bool,
}

/// Source reference of a PDF conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// Explicit source filename from a `[PDF_SOURCE:...]` marker.
    Named(String),
    /// `*` or a missing source marker: first available PDF attachment.
    Wildcard,
}

impl SourceRef {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == "*" {
            Self::Wildcard
        } else {
            Self::Named(trimmed.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Wildcard => "*",
        }
    }
}

/// A `[CONVERT_PDF_TO_DOCX:...]` request paired with its source reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub output_name: String,
    pub source: SourceRef,
}

/// How an artifact came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Encoded from content the model authored.
    Generated,
    /// Structurally converted from a real source attachment.
    Converted,
}

/// A generated file, ready to attach to the outgoing message.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub filename: String,
    pub kind: FileKind,
    pub mime: String,
    pub provenance: Provenance,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Artifact {
    pub fn generated(kind: FileKind, name: &str, data: Vec<u8>) -> Self {
        Self::with_provenance(kind, name, data, Provenance::Generated)
    }

    pub fn converted(kind: FileKind, name: &str, data: Vec<u8>) -> Self {
        Self::with_provenance(kind, name, data, Provenance::Converted)
    }

    fn with_provenance(kind: FileKind, name: &str, data: Vec<u8>, provenance: Provenance) -> Self {
        Self {
            filename: format!("{}.{}", name, kind.extension()),
            kind,
            mime: kind.mime().to_string(),
            provenance,
            data,
        }
    }
}

/// The pipeline's produced contract: sanitized display text, the model's
/// confidence self-assessment, and the artifacts in generation order.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReply {
    pub text: String,
    pub confidence: Option<u8>,
    pub artifacts: Vec<Artifact>,
}
