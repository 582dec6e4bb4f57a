//! Direct text extraction: read the PDF's embedded text layer.
//!
//! The outcome is a value, not an error. A PDF that cannot be parsed and a
//! PDF whose text layer is empty (a scan) are both ordinary inputs here, and
//! both resolve to [`TextLayerOutcome::FallbackRequired`], which tells the
//! orchestrator to rasterise and OCR instead.

use crate::error::ExtractError;
use crate::output::{ExtractedDocument, FallbackReason};
use crate::pipeline::pdfium::PdfiumBackend;
use std::path::Path;
use tracing::{debug, info};

/// Reads the embedded text of every page.
pub trait TextLayerReader {
    /// Text of each page, in physical page order.
    fn read_pages(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractError>;
}

impl TextLayerReader for PdfiumBackend {
    fn read_pages(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractError> {
        let document = self.open(pdf_path)?;
        let pages = document.pages();
        info!("PDF has {} pages", pages.len());

        let mut texts = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| ExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;
            let text = text.all();
            debug!("Page {}: {} chars in text layer", idx + 1, text.chars().count());
            texts.push(text);
        }
        Ok(texts)
    }
}

/// Result of trying the text layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextLayerOutcome {
    /// The text layer carries real content.
    Sufficient(ExtractedDocument),
    /// Use rasterisation + OCR instead; any partial text is discarded.
    FallbackRequired(FallbackReason),
}

/// Read the text layer and decide whether it is good enough.
///
/// Succeeds when the trimmed page bodies hold more than `min_chars`
/// characters in total.
pub fn read_text_layer(
    reader: &dyn TextLayerReader,
    pdf_path: &Path,
    min_chars: usize,
) -> TextLayerOutcome {
    let texts = match reader.read_pages(pdf_path) {
        Ok(texts) => texts,
        Err(e) => {
            return TextLayerOutcome::FallbackRequired(FallbackReason::Unreadable {
                detail: e.to_string(),
            })
        }
    };

    let document = ExtractedDocument::from_texts(texts);
    let chars = document.content_chars();
    if chars > min_chars {
        TextLayerOutcome::Sufficient(document)
    } else {
        TextLayerOutcome::FallbackRequired(FallbackReason::Insufficient {
            chars,
            threshold: min_chars,
        })
    }
}
