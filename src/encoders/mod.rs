//! Encoder collaborators that turn directive content into file artifacts.
//!
//! The pipeline only sees the [`ArtifactEncoder`] seam: one method per
//! artifact kind plus the structural PDF→DOCX converter, each returning a
//! finished artifact or an error. [`DefaultEncoders`] is the shipped
//! implementation; callers with their own document tooling can substitute
//! theirs.

pub mod chart;
pub mod docx;
pub mod pdf;
pub mod xlsx;

use crate::types::{Artifact, FileKind, SourceAttachment};

pub use chart::ChartClient;

/// Failure from an encoder or converter. Always caught and logged by the
/// caller; never propagated past the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP packaging: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chart service returned HTTP {0}")]
    ChartService(u16),
    #[error("PDF assembly failed: {0}")]
    PdfBuild(String),
    #[error("PDF extraction: {0}")]
    PdfExtract(String),
    #[error("PDF extraction panicked on '{0}'")]
    ExtractionPanicked(String),
    #[error("no text layer in '{0}'")]
    NoTextLayer(String),
}

/// One encoder per artifact kind, plus structural conversion.
///
/// Names arrive without an extension; implementations append the kind's own.
pub trait ArtifactEncoder {
    fn text_file(&self, content: &str, name: &str) -> Result<Artifact, EncodeError>;
    fn markdown_file(&self, content: &str, name: &str) -> Result<Artifact, EncodeError>;
    fn csv_file(&self, content: &str, name: &str) -> Result<Artifact, EncodeError>;
    fn pdf_report(&self, content: &str, name: &str) -> Result<Artifact, EncodeError>;
    fn word_document(&self, content: &str, name: &str) -> Result<Artifact, EncodeError>;
    fn spreadsheet(&self, rows: &[Vec<String>], name: &str) -> Result<Artifact, EncodeError>;
    fn chart_image(&self, config: &serde_json::Value, name: &str)
        -> Result<Artifact, EncodeError>;
    /// Convert a real PDF source instead of re-encoding model text.
    fn pdf_to_docx(&self, source: &SourceAttachment, name: &str)
        -> Result<Artifact, EncodeError>;
}

/// The shipped encoder set.
pub struct DefaultEncoders {
    chart: ChartClient,
}

impl DefaultEncoders {
    pub fn new() -> Self {
        Self {
            chart: ChartClient::new(),
        }
    }

    /// Use a non-default chart renderer endpoint (self-hosted QuickChart).
    pub fn with_chart_client(chart: ChartClient) -> Self {
        Self { chart }
    }
}

impl Default for DefaultEncoders {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactEncoder for DefaultEncoders {
    fn text_file(&self, content: &str, name: &str) -> Result<Artifact, EncodeError> {
        Ok(Artifact::generated(
            FileKind::Txt,
            name,
            content.as_bytes().to_vec(),
        ))
    }

    fn markdown_file(&self, content: &str, name: &str) -> Result<Artifact, EncodeError> {
        Ok(Artifact::generated(
            FileKind::Md,
            name,
            content.as_bytes().to_vec(),
        ))
    }

    fn csv_file(&self, content: &str, name: &str) -> Result<Artifact, EncodeError> {
        Ok(Artifact::generated(
            FileKind::Csv,
            name,
            content.as_bytes().to_vec(),
        ))
    }

    fn pdf_report(&self, content: &str, name: &str) -> Result<Artifact, EncodeError> {
        pdf::render_report(content, name)
    }

    fn word_document(&self, content: &str, name: &str) -> Result<Artifact, EncodeError> {
        docx::from_text(content, name)
    }

    fn spreadsheet(&self, rows: &[Vec<String>], name: &str) -> Result<Artifact, EncodeError> {
        xlsx::from_table(rows, name)
    }

    fn chart_image(
        &self,
        config: &serde_json::Value,
        name: &str,
    ) -> Result<Artifact, EncodeError> {
        self.chart.render_png(config, name)
    }

    fn pdf_to_docx(
        &self,
        source: &SourceAttachment,
        name: &str,
    ) -> Result<Artifact, EncodeError> {
        docx::from_pdf(source, name)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scriptable encoder for pipeline tests: produces stub artifacts and
    //! fails on demand.

    use super::*;

    #[derive(Default)]
    pub struct StubEncoder {
        /// Any call whose name contains this substring fails.
        pub fail_name_containing: Option<&'static str>,
        /// Make `pdf_to_docx` fail regardless of name.
        pub fail_conversion: bool,
    }

    impl StubEncoder {
        fn check(&self, name: &str) -> Result<(), EncodeError> {
            if let Some(marker) = self.fail_name_containing {
                if name.contains(marker) {
                    return Err(EncodeError::PdfBuild(format!("stub failure for '{name}'")));
                }
            }
            Ok(())
        }

        fn stub(&self, kind: FileKind, name: &str) -> Result<Artifact, EncodeError> {
            self.check(name)?;
            Ok(Artifact::generated(kind, name, b"stub".to_vec()))
        }
    }

    impl ArtifactEncoder for StubEncoder {
        fn text_file(&self, _content: &str, name: &str) -> Result<Artifact, EncodeError> {
            self.stub(FileKind::Txt, name)
        }

        fn markdown_file(&self, _content: &str, name: &str) -> Result<Artifact, EncodeError> {
            self.stub(FileKind::Md, name)
        }

        fn csv_file(&self, _content: &str, name: &str) -> Result<Artifact, EncodeError> {
            self.stub(FileKind::Csv, name)
        }

        fn pdf_report(&self, _content: &str, name: &str) -> Result<Artifact, EncodeError> {
            self.stub(FileKind::Pdf, name)
        }

        fn word_document(&self, _content: &str, name: &str) -> Result<Artifact, EncodeError> {
            self.stub(FileKind::Docx, name)
        }

        fn spreadsheet(
            &self,
            _rows: &[Vec<String>],
            name: &str,
        ) -> Result<Artifact, EncodeError> {
            self.stub(FileKind::Xlsx, name)
        }

        fn chart_image(
            &self,
            _config: &serde_json::Value,
            name: &str,
        ) -> Result<Artifact, EncodeError> {
            self.stub(FileKind::Chart, name)
        }

        fn pdf_to_docx(
            &self,
            source: &SourceAttachment,
            name: &str,
        ) -> Result<Artifact, EncodeError> {
            if self.fail_conversion {
                return Err(EncodeError::NoTextLayer(source.name.clone()));
            }
            self.check(name)?;
            Ok(Artifact::converted(FileKind::Docx, name, b"stub".to_vec()))
        }
    }
}
