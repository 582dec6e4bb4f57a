//! PDF rasterisation: render every page to a `DynamicImage` for OCR.
//!
//! Pages are rendered at `dpi / 72` scale, PDF user space being 72 units per
//! inch. Rendering is all-or-nothing: a page that fails to render aborts the
//! run, since its absence would silently shift every later page number.

use crate::error::ExtractError;
use crate::pipeline::pdfium::PdfiumBackend;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Produces one bitmap per PDF page.
pub trait PageRasterizer {
    /// Images in physical page order.
    fn rasterize(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, ExtractError>;
}

impl PageRasterizer for PdfiumBackend {
    fn rasterize(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<DynamicImage>, ExtractError> {
        info!("Converting PDF to images at {} DPI", dpi);

        let document = self.open(pdf_path)?;
        let pages = document.pages();
        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale_for_dpi(dpi));

        let mut images = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ExtractError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        info!("Successfully converted {} pages", images.len());
        Ok(images)
    }
}

/// Scale factor from PDF points to pixels.
pub fn scale_for_dpi(dpi: u32) -> f32 {
    dpi as f32 / 72.0
}

/// Rasterise and insist on at least one page.
pub fn rasterize_pages(
    rasterizer: &dyn PageRasterizer,
    pdf_path: &Path,
    dpi: u32,
) -> Result<Vec<DynamicImage>, ExtractError> {
    let images = rasterizer.rasterize(pdf_path, dpi)?;
    if images.is_empty() {
        return Err(ExtractError::NoPagesRendered {
            path: pdf_path.to_path_buf(),
        });
    }
    Ok(images)
}
