//! Result types produced by an extraction run.

use crate::error::PageError;
use std::fmt;
use std::path::PathBuf;

/// Which path produced the final text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// The PDF's embedded text layer.
    TextLayer,
    /// Rasterisation + OCR.
    Ocr,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::TextLayer => f.write_str("text layer"),
            ExtractionMethod::Ocr => f.write_str("OCR"),
        }
    }
}

/// Why the text layer was not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// OCR was requested up front; the text layer was never read.
    Forced,
    /// The PDF could not be opened or its text could not be read.
    Unreadable { detail: String },
    /// The text layer was readable but too small to be real content.
    Insufficient { chars: usize, threshold: usize },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Forced => f.write_str("forced OCR mode enabled"),
            FallbackReason::Unreadable { detail } => write!(f, "text extraction failed: {detail}"),
            FallbackReason::Insufficient { chars, threshold } => write!(
                f,
                "text extraction yielded minimal results ({chars} chars, need more than {threshold}); likely a scanned PDF"
            ),
        }
    }
}

/// Text for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// 1-based physical page number.
    pub page_num: usize,
    /// Page text; empty when `error` is set.
    pub text: String,
    /// Wall-clock time spent on this page.
    pub duration_ms: u64,
    /// Set when OCR failed for this page.
    pub error: Option<PageError>,
}

impl PageResult {
    pub fn ok(page_num: usize, text: String, duration_ms: u64) -> Self {
        Self {
            page_num,
            text,
            duration_ms,
            error: None,
        }
    }

    pub fn failed(error: PageError, duration_ms: u64) -> Self {
        Self {
            page_num: error.page(),
            text: String::new(),
            duration_ms,
            error: Some(error),
        }
    }
}

/// Page texts in physical page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    pages: Vec<PageResult>,
}

impl ExtractedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from page texts in order; pages are numbered from 1.
    pub fn from_texts<I>(texts: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageResult::ok(i + 1, text, 0))
            .collect();
        Self { pages }
    }

    /// Append the next page. Callers push pages in physical order.
    pub fn push(&mut self, page: PageResult) {
        debug_assert_eq!(page.page_num, self.pages.len() + 1);
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[PageResult] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Characters of real content: trimmed page bodies, headers excluded.
    pub fn content_chars(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.text.trim().chars().count())
            .sum()
    }

    /// Pages whose OCR call failed.
    pub fn failed_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.error.is_some()).count()
    }

    /// The flat text blob: `--- Page N ---` header, page text, blank line.
    pub fn render(&self) -> String {
        let capacity = self.pages.iter().map(|p| p.text.len() + 24).sum();
        let mut out = String::with_capacity(capacity);
        for page in &self.pages {
            out.push_str(&page_header(page.page_num));
            out.push('\n');
            out.push_str(&page.text);
            out.push_str("\n\n");
        }
        out
    }
}

/// The marker line placed before every page.
pub fn page_header(page_num: usize) -> String {
    format!("--- Page {page_num} ---")
}

/// What happened to the optional output file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveOutcome {
    /// No output path was given.
    #[default]
    NotRequested,
    /// Text written to this path.
    Saved(PathBuf),
    /// Writing failed; the text is still in [`ExtractionOutput::text`].
    Failed { path: PathBuf, reason: String },
}

/// Timing and page counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub total_pages: usize,
    /// Pages whose OCR call failed (always 0 for the text layer).
    pub failed_pages: usize,
    /// Time spent reading the text layer (0 when OCR was forced).
    pub text_layer_duration_ms: u64,
    /// Time spent rasterising (0 when the text layer sufficed).
    pub render_duration_ms: u64,
    /// Time spent preprocessing and recognising pages.
    pub ocr_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    /// The rendered text blob.
    pub text: String,
    pub document: ExtractedDocument,
    pub method: ExtractionMethod,
    /// Set when OCR was used.
    pub fallback: Option<FallbackReason>,
    pub stats: ExtractionStats,
    pub saved: SaveOutcome,
}

impl ExtractionOutput {
    /// Length of [`Self::text`] in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// The first `max_chars` characters of the text.
    pub fn preview(&self, max_chars: usize) -> Preview<'_> {
        Preview::of(&self.text, max_chars)
    }
}

/// A bounded prefix of some text, cut on a character boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview<'a> {
    pub head: &'a str,
    pub truncated: bool,
}

impl<'a> Preview<'a> {
    pub fn of(text: &'a str, max_chars: usize) -> Self {
        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => Preview {
                head: &text[..cut],
                truncated: true,
            },
            None => Preview {
                head: text,
                truncated: false,
            },
        }
    }
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.head)?;
        if self.truncated {
            f.write_str("\n...")?;
        }
        Ok(())
    }
}
