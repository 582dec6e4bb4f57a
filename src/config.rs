//! Configuration types for PDF text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to log a run's settings and diff two runs to understand why
//! their outputs differ.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::PathBuf;

/// Rasterisation resolution used when OCR is needed.
pub const DEFAULT_DPI: u32 = 300;

/// A text layer must carry more than this many characters to be trusted.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 50;

/// Tesseract language used when none is given.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Tesseract `--oem 1`: LSTM engine only.
pub const DEFAULT_ENGINE_MODE: u8 = 1;

/// Tesseract `--psm 3`: fully automatic page segmentation.
pub const DEFAULT_PAGE_SEG_MODE: u8 = 3;

/// Characters of extracted text shown in the end-of-run preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 1000;

const MIN_DPI: u32 = 72;
const MAX_DPI: u32 = 600;

/// One or more tesseract language codes joined with `+`, e.g. `eng+fra`,
/// `chi_sim`, `script/Latin`.
static LANGUAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_/-]+(\+[A-Za-z0-9_/-]+)*$").unwrap());

/// Configuration for a single extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2txt::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .language("eng+fra")
///     .force_ocr(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Rendering DPI used when rasterising pages for OCR. Range: 72–600. Default: 300.
    ///
    /// Tesseract is tuned for glyphs around 20–30 px high; 300 DPI puts body
    /// text of a typical document in that band.
    pub dpi: u32,

    /// Tesseract language code(s). Default: `eng`.
    pub language: String,

    /// Skip the text layer and always OCR. Default: false.
    pub force_ocr: bool,

    /// Minimum text-layer size, in characters, below which the document is
    /// treated as scanned. Default: [`DEFAULT_MIN_TEXT_CHARS`].
    ///
    /// Counted over the trimmed page bodies only, so `--- Page N ---`
    /// headers of an image-only document never count as content.
    pub min_text_chars: usize,

    /// Tesseract OCR engine mode (`--oem`). Default: 1.
    pub engine_mode: u8,

    /// Tesseract page segmentation mode (`--psm`). Default: 3.
    pub page_seg_mode: u8,

    /// Explicit pdfium library file or directory.
    pub pdfium_library_path: Option<PathBuf>,

    /// Explicit tesseract executable (or its directory).
    pub tesseract_path: Option<PathBuf>,

    /// Receives per-page progress events. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            language: DEFAULT_LANGUAGE.to_string(),
            force_ocr: false,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
            engine_mode: DEFAULT_ENGINE_MODE,
            page_seg_mode: DEFAULT_PAGE_SEG_MODE,
            pdfium_library_path: None,
            tesseract_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("language", &self.language)
            .field("force_ocr", &self.force_ocr)
            .field("min_text_chars", &self.min_text_chars)
            .field("engine_mode", &self.engine_mode)
            .field("page_seg_mode", &self.page_seg_mode)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("tesseract_path", &self.tesseract_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The OCR settings handed to the engine for every page.
    pub fn ocr_settings(&self) -> OcrSettings {
        OcrSettings {
            language: self.language.clone(),
            engine_mode: self.engine_mode,
            page_seg_mode: self.page_seg_mode,
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into().trim().to_string();
        self
    }

    pub fn force_ocr(mut self, v: bool) -> Self {
        self.config.force_ocr = v;
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn engine_mode(mut self, oem: u8) -> Self {
        self.config.engine_mode = oem;
        self
    }

    pub fn page_seg_mode(mut self, psm: u8) -> Self {
        self.config.page_seg_mode = psm;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if !LANGUAGE_RE.is_match(&c.language) {
            return Err(ExtractError::InvalidConfig(format!(
                "Invalid OCR language '{}': expected codes like 'eng' or 'eng+fra'",
                c.language
            )));
        }
        if c.engine_mode > 3 {
            return Err(ExtractError::InvalidConfig(format!(
                "OCR engine mode must be 0–3, got {}",
                c.engine_mode
            )));
        }
        if c.page_seg_mode > 13 {
            return Err(ExtractError::InvalidConfig(format!(
                "Page segmentation mode must be 0–13, got {}",
                c.page_seg_mode
            )));
        }
        Ok(self.config)
    }
}

/// Fixed per-run OCR engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    /// Language code(s), e.g. `eng+fra`.
    pub language: String,
    /// `--oem` value.
    pub engine_mode: u8,
    /// `--psm` value.
    pub page_seg_mode: u8,
}

impl Default for OcrSettings {
    fn default() -> Self {
        ExtractionConfig::default().ocr_settings()
    }
}

impl OcrSettings {
    /// Command-line arguments in tesseract's option syntax.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            "-l".to_string(),
            self.language.clone(),
            "--oem".to_string(),
            self.engine_mode.to_string(),
            "--psm".to_string(),
            self.page_seg_mode.to_string(),
        ]
    }
}
