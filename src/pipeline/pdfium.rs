//! The pdfium-backed implementation of the text-layer reader and rasteriser.
//!
//! One bound [`Pdfium`] instance serves both stages of a run; binding happens
//! once, through [`pdfium_locate`], so the rest of the pipeline never sees
//! platform-specific library paths.

use crate::error::ExtractError;
use pdfium_locate::Located;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::info;

/// A bound pdfium library.
pub struct PdfiumBackend {
    pdfium: Pdfium,
    located: Located,
}

impl PdfiumBackend {
    /// Locate and bind pdfium: explicit path → `PDFIUM_LIB_PATH` →
    /// conventional directories → system library.
    pub fn bind(explicit: Option<&Path>) -> Result<Self, ExtractError> {
        let (pdfium, located) = pdfium_locate::bind_pdfium(explicit)
            .map_err(|e| ExtractError::PdfiumBindingFailed(e.to_string()))?;
        info!("PDFium bound from {}", located.describe());
        Ok(Self { pdfium, located })
    }

    /// Where the library was loaded from.
    pub fn located(&self) -> &Located {
        &self.located
    }

    pub(crate) fn open(&self, pdf_path: &Path) -> Result<PdfDocument<'_>, ExtractError> {
        self.pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| ExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })
    }
}
