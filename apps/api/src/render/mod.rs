// Document rendering: DocumentModel in, downloadable bytes out.
// PDF layout is CPU-bound; callers run it inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod markdown;
pub mod pdf;

use serde::Deserialize;
use thiserror::Error;

use crate::errors::AppError;
use crate::resume::assemble::DocumentModel;

pub use markdown::MarkdownRenderer;
pub use pdf::PdfRenderer;

/// File name used when the record has a blank title.
const FALLBACK_FILE_STEM: &str = "resume";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err.to_string())
    }
}

pub trait DocumentRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn extension(&self) -> &'static str;
    fn render(&self, doc: &DocumentModel) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Pdf,
    #[serde(alias = "markdown")]
    Md,
}

impl RenderFormat {
    pub fn renderer(self) -> Box<dyn DocumentRenderer> {
        match self {
            RenderFormat::Pdf => Box::new(PdfRenderer::default()),
            RenderFormat::Md => Box::new(MarkdownRenderer),
        }
    }
}

/// `title` with spaces replaced by underscores, plus the renderer's extension.
pub fn file_name(title: &str, extension: &str) -> String {
    let stem = match title.trim() {
        "" => FALLBACK_FILE_STEM,
        t => t,
    };
    format!("{}.{}", stem.replace(' ', "_"), extension)
}
