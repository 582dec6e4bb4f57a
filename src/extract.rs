//! Extraction entry points.
//!
//! [`Extractor`] sequences the pipeline stages over injected backends:
//!
//! ```text
//! validate ──▶ force_ocr? ──no──▶ text layer ──sufficient──▶ done
//!                  │                   │
//!                 yes              fallback
//!                  │                   │
//!                  └──────▶ probe OCR ─┴─▶ rasterise ──▶ per page: preprocess ──▶ OCR ──▶ done
//! ```
//!
//! [`extract`] and [`extract_to_file`] bind the production backends (pdfium,
//! the `tesseract` executable) and delegate to an [`Extractor`].

use crate::config::ExtractionConfig;
use crate::error::{ExtractError, PageError, TESSERACT_INSTALL_HINT};
use crate::output::{
    ExtractedDocument, ExtractionMethod, ExtractionOutput, ExtractionStats, FallbackReason,
    PageResult, SaveOutcome,
};
use crate::pipeline::ocr::{OcrEngine, TesseractCli};
use crate::pipeline::pdfium::PdfiumBackend;
use crate::pipeline::render::{self, PageRasterizer};
use crate::pipeline::text::{self, TextLayerOutcome, TextLayerReader};
use crate::pipeline::{input, preprocess};
use pdfium_locate::Located;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs one extraction over a set of backends.
///
/// The backends are borrowed, so one bound pdfium instance can serve as both
/// text-layer reader and rasteriser.
pub struct Extractor<'a> {
    text_layer: &'a dyn TextLayerReader,
    rasterizer: &'a dyn PageRasterizer,
    ocr: &'a dyn OcrEngine,
}

impl<'a> Extractor<'a> {
    pub fn new(
        text_layer: &'a dyn TextLayerReader,
        rasterizer: &'a dyn PageRasterizer,
        ocr: &'a dyn OcrEngine,
    ) -> Self {
        Self {
            text_layer,
            rasterizer,
            ocr,
        }
    }

    /// Extract the text of `pdf_path`.
    ///
    /// # Returns
    /// `Ok(ExtractionOutput)` whenever a document was produced, even if some
    /// pages failed OCR (see `output.stats.failed_pages`).
    ///
    /// # Errors
    /// Only fatal conditions: unreadable input, OCR engine missing when OCR is
    /// needed, nothing rasterised.
    pub fn run(
        &self,
        pdf_path: &Path,
        config: &ExtractionConfig,
    ) -> Result<ExtractionOutput, ExtractError> {
        let total_start = Instant::now();
        let pdf_path = input::validate_input(pdf_path)?;
        info!("Starting extraction: {}", pdf_path.display());
        debug!("{:?}", config);

        let mut stats = ExtractionStats::default();

        // ── Step 1: Text layer, unless OCR is forced ─────────────────────────
        let reason = if config.force_ocr {
            info!("Forced OCR mode enabled, skipping text extraction");
            FallbackReason::Forced
        } else {
            info!("Attempting text-based extraction");
            let started = Instant::now();
            let outcome = text::read_text_layer(self.text_layer, &pdf_path, config.min_text_chars);
            stats.text_layer_duration_ms = elapsed_ms(started);

            match outcome {
                TextLayerOutcome::Sufficient(document) => {
                    info!(
                        "Text extraction successful: {} chars over {} pages",
                        document.content_chars(),
                        document.len()
                    );
                    report_text_layer(config, &document);
                    return Ok(finish(
                        document,
                        ExtractionMethod::TextLayer,
                        None,
                        stats,
                        total_start,
                        config,
                    ));
                }
                TextLayerOutcome::FallbackRequired(reason) => {
                    warn!("{}; falling back to OCR", reason);
                    reason
                }
            }
        };

        if let Some(ref cb) = config.progress_callback {
            cb.on_fallback(&reason);
        }

        // ── Step 2: Rasterise + OCR ──────────────────────────────────────────
        let document = self.ocr_document(&pdf_path, config, &mut stats)?;
        Ok(finish(
            document,
            ExtractionMethod::Ocr,
            Some(reason),
            stats,
            total_start,
            config,
        ))
    }

    /// [`Self::run`], then write the text to `output_path` if one is given.
    ///
    /// A failed write is reported in [`ExtractionOutput::saved`]; the text is
    /// returned regardless.
    pub fn run_to_file(
        &self,
        pdf_path: &Path,
        output_path: Option<&Path>,
        config: &ExtractionConfig,
    ) -> Result<ExtractionOutput, ExtractError> {
        let mut output = self.run(pdf_path, config)?;
        if let Some(path) = output_path {
            output.saved = write_output(path, &output.text);
        }
        Ok(output)
    }

    fn ocr_document(
        &self,
        pdf_path: &Path,
        config: &ExtractionConfig,
        stats: &mut ExtractionStats,
    ) -> Result<ExtractedDocument, ExtractError> {
        info!("Starting OCR processing with language: {}", config.language);

        let version = self
            .ocr
            .version()
            .map_err(|e| ExtractError::OcrEngineUnavailable {
                program: self.ocr.name(),
                detail: e.to_string(),
            })?;
        info!("Tesseract version: {}", version);

        let render_start = Instant::now();
        let images = render::rasterize_pages(self.rasterizer, pdf_path, config.dpi)?;
        stats.render_duration_ms = elapsed_ms(render_start);

        let total = images.len();
        if let Some(ref cb) = config.progress_callback {
            cb.on_extraction_start(ExtractionMethod::Ocr, total);
        }

        let settings = config.ocr_settings();
        let ocr_start = Instant::now();
        let mut document = ExtractedDocument::new();

        for (idx, image) in images.into_iter().enumerate() {
            let page_num = idx + 1;
            info!("Processing page {}/{}", page_num, total);
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_start(page_num, total);
            }

            let page_start = Instant::now();
            let processed = preprocess::preprocess(&image);
            drop(image);

            let page = match self.ocr.recognize(&processed, &settings) {
                Ok(text) => {
                    let ms = elapsed_ms(page_start);
                    debug!("Page {}: {} chars in {}ms", page_num, text.chars().count(), ms);
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_page_complete(page_num, total, text.chars().count());
                    }
                    PageResult::ok(page_num, text, ms)
                }
                Err(e) => {
                    let error = PageError::OcrFailed {
                        page: page_num,
                        detail: e.to_string(),
                    };
                    warn!("{}", error);
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_page_error(page_num, total, &error.to_string());
                    }
                    PageResult::failed(error, elapsed_ms(page_start))
                }
            };
            document.push(page);
        }

        stats.ocr_duration_ms = elapsed_ms(ocr_start);
        Ok(document)
    }
}

/// Extract the text of a PDF with pdfium and tesseract.
///
/// This is the primary entry point for the library.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2txt::{extract, ExtractionConfig};
///
/// let output = extract("scan.pdf", &ExtractionConfig::default())?;
/// println!("{} ({})", output.text, output.method);
/// # Ok::<(), edgequake_pdf2txt::ExtractError>(())
/// ```
pub fn extract(
    pdf_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    extract_to_file(pdf_path, None, config)
}

/// Extract, then write the text to `output_path` when given.
///
/// The input is validated before any backend is bound, so a missing input
/// never leaves an output file behind.
pub fn extract_to_file(
    pdf_path: impl AsRef<Path>,
    output_path: Option<&Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let pdf_path = input::validate_input(pdf_path.as_ref())?;

    let pdfium = PdfiumBackend::bind(config.pdfium_library_path.as_deref())?;
    let tesseract = TesseractCli::locate(config.tesseract_path.as_deref());

    Extractor::new(&pdfium, &pdfium, &tesseract).run_to_file(&pdf_path, output_path, config)
}

/// Write the text blob as UTF-8. Never fails the run.
pub fn write_output(path: &Path, text: &str) -> SaveOutcome {
    let written = File::create(path).and_then(|mut file| file.write_all(text.as_bytes()));
    match written {
        Ok(()) => {
            info!("Saved extracted text to: {}", path.display());
            SaveOutcome::Saved(path.to_path_buf())
        }
        Err(source) => {
            let reason = source.to_string();
            warn!(
                "{}",
                ExtractError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source,
                }
            );
            SaveOutcome::Failed {
                path: path.to_path_buf(),
                reason,
            }
        }
    }
}

// ── Dependency check ─────────────────────────────────────────────────────

/// Availability of the external libraries and tools.
#[derive(Debug, Clone)]
pub struct DependencyReport {
    /// Where pdfium was bound from, or why binding failed.
    pub pdfium: Result<Located, String>,
    /// Where the tesseract executable was looked up.
    pub tesseract: Located,
    /// The probed tesseract version, or why probing failed.
    pub tesseract_version: Result<String, String>,
}

impl DependencyReport {
    /// Both a text-layer PDF and a scan can be processed.
    pub fn is_ready(&self) -> bool {
        self.pdfium.is_ok() && self.tesseract_version.is_ok()
    }
}

impl fmt::Display for DependencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pdfium {
            Ok(located) => writeln!(f, "✓ PDFium bound from {}", located.describe())?,
            Err(e) => writeln!(f, "✗ PDFium unavailable: {e}")?,
        }
        match &self.tesseract_version {
            Ok(version) => writeln!(
                f,
                "✓ Tesseract {version} ({})",
                self.tesseract.describe()
            )?,
            Err(e) => {
                writeln!(f, "✗ Tesseract unavailable ({}): {e}", self.tesseract.describe())?;
                writeln!(f)?;
                writeln!(f, "{TESSERACT_INSTALL_HINT}")?;
            }
        }
        Ok(())
    }
}

/// Bind pdfium and probe tesseract without touching any PDF.
pub fn check_dependencies(config: &ExtractionConfig) -> DependencyReport {
    let pdfium = PdfiumBackend::bind(config.pdfium_library_path.as_deref())
        .map(|backend| backend.located().clone())
        .map_err(|e| e.to_string());
    let tesseract = TesseractCli::locate(config.tesseract_path.as_deref());
    let tesseract_version = tesseract.version().map_err(|e| e.to_string());

    DependencyReport {
        pdfium,
        tesseract: tesseract.located().clone(),
        tesseract_version,
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn report_text_layer(config: &ExtractionConfig, document: &ExtractedDocument) {
    let Some(ref cb) = config.progress_callback else {
        return;
    };
    let total = document.len();
    cb.on_extraction_start(ExtractionMethod::TextLayer, total);
    for page in document.pages() {
        cb.on_page_complete(page.page_num, total, page.text.chars().count());
    }
}

fn finish(
    document: ExtractedDocument,
    method: ExtractionMethod,
    fallback: Option<FallbackReason>,
    mut stats: ExtractionStats,
    total_start: Instant,
    config: &ExtractionConfig,
) -> ExtractionOutput {
    let text = document.render();
    stats.total_pages = document.len();
    stats.failed_pages = document.failed_pages();
    stats.total_duration_ms = elapsed_ms(total_start);

    info!(
        "Extraction complete via {}: {}/{} pages, {} chars, {}ms total",
        method,
        stats.total_pages - stats.failed_pages,
        stats.total_pages,
        text.chars().count(),
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(stats.total_pages, stats.total_pages - stats.failed_pages);
    }

    ExtractionOutput {
        text,
        document,
        method,
        fallback,
        stats,
        saved: SaveOutcome::NotRequested,
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
