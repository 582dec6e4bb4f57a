//! # edgequake-pdf2txt
//!
//! Extract plain text from PDF documents, falling back to Tesseract OCR when
//! the document is a scan.
//!
//! ## How it decides
//!
//! Most PDFs carry an embedded text layer, and reading it is fast and exact.
//! Scanned documents carry only page images, so their text layer is empty or
//! holds a few stray characters. This crate reads the text layer first and
//! only when it holds no more than 50 characters of real content (or cannot
//! be read at all) does it rasterise every page and run OCR.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       check the file exists and is readable
//!  ├─ 2. Text layer  read embedded text via pdfium; done if > 50 chars
//!  ├─ 3. Render      rasterise pages at 300 DPI (pdfium)
//!  ├─ 4. Enhance     grayscale → contrast ×2.0 → sharpness ×2.0 → brightness ×1.1
//!  ├─ 5. OCR         tesseract --oem 1 --psm 3 -l <lang>, one page at a time
//!  └─ 6. Output      "--- Page N ---" blocks, optional .txt file, stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2txt::{extract, ExtractionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder().language("eng+fra").build()?;
//!     let output = extract("document.pdf", &config)?;
//!     println!("{}", output.text);
//!     eprintln!("{} pages via {}", output.stats.total_pages, output.method);
//!     Ok(())
//! }
//! ```
//!
//! ## External requirements
//!
//! | Tool      | Needed for          | Lookup order                                                  |
//! |-----------|---------------------|---------------------------------------------------------------|
//! | pdfium    | text layer, render  | `pdfium_library_path` → `PDFIUM_LIB_PATH` → cache / lib dirs → system |
//! | tesseract | OCR fallback only   | `tesseract_path` → `TESSERACT_PATH` → install dirs → `PATH`   |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf2txt = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, OcrSettings};
pub use error::{ExtractError, PageError};
pub use extract::{check_dependencies, extract, extract_to_file, DependencyReport, Extractor};
pub use output::{
    ExtractedDocument, ExtractionMethod, ExtractionOutput, ExtractionStats, FallbackReason,
    PageResult, Preview, SaveOutcome,
};
pub use pipeline::ocr::{OcrEngine, OcrError, TesseractCli};
pub use pipeline::render::PageRasterizer;
pub use pipeline::text::{TextLayerOutcome, TextLayerReader};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
