//! Error types for the edgequake-pdf2txt library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the run cannot proceed at all (missing
//!   input, nothing could be rasterised, OCR engine not installed). Returned
//!   as `Err(ExtractError)` from the top-level `extract*` functions.
//!
//! * [`PageError`] — **Non-fatal**: OCR failed for a single page but every
//!   other page is fine. Stored inside [`crate::output::PageResult`]; the
//!   page keeps its `--- Page N ---` header with an empty body.
//!
//! A failed text-layer read is neither: it is an expected branch and is
//! modelled as [`crate::pipeline::text::TextLayerOutcome::FallbackRequired`].

use std::path::PathBuf;
use thiserror::Error;

/// Install hints shared by the OCR-missing error and the dependency report.
pub const TESSERACT_INSTALL_HINT: &str = "\
Please install Tesseract OCR:\n\
  - Mac: brew install tesseract\n\
  - Windows: Download from https://github.com/UB-Mannheim/tesseract/wiki\n\
  - Linux: sudo apt-get install tesseract-ocr\n\
Or point --tesseract / TESSERACT_PATH at an existing executable.";

/// All fatal errors returned by the edgequake-pdf2txt library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path exists but is not a regular file.
    #[error("Not a file: '{path}'")]
    NotAFile { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF could not be opened or parsed.
    #[error("PDF '{path}' could not be opened: {detail}\nPlease ensure the PDF file exists and is not corrupted.")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Rasterisation succeeded but produced no page images.
    #[error("Converting '{path}' to images produced no pages")]
    NoPagesRendered { path: PathBuf },

    // ── External tools ────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n\
  • Download a build from https://github.com/bblanchon/pdfium-binaries.\n\
  • Install pdfium into a standard library directory.\n"
    )]
    PdfiumBindingFailed(String),

    /// The OCR engine executable is missing or unusable.
    #[error("Tesseract is not installed or not in PATH ({program}): {detail}\n\n{hint}", hint = TESSERACT_INSTALL_HINT)]
    OcrEngineUnavailable { program: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// The OCR engine failed on this page.
    #[error("Page {page}: OCR failed: {detail}")]
    OcrFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-based page number the error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::OcrFailed { page, .. } => *page,
        }
    }
}
