//! Orchestration tests for `Extractor`, driven by in-memory backends.
//!
//! None of these need pdfium or tesseract: the text-layer reader, the
//! rasteriser and the OCR engine are scripted doubles that count their calls.

use edgequake_pdf2txt::{
    ExtractError, ExtractionConfig, ExtractionMethod, ExtractionProgressCallback, Extractor,
    FallbackReason, OcrEngine, OcrError, OcrSettings, PageRasterizer, SaveOutcome,
    TextLayerReader,
};
use image::DynamicImage;
use std::cell::{Cell, RefCell};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{NamedTempFile, TempDir};

// ── Test doubles ─────────────────────────────────────────────────────────────

struct ScriptedText {
    pages: Result<Vec<String>, String>,
    calls: Cell<usize>,
}

impl ScriptedText {
    fn pages(pages: &[&str]) -> Self {
        Self {
            pages: Ok(pages.iter().map(|s| s.to_string()).collect()),
            calls: Cell::new(0),
        }
    }

    fn broken(detail: &str) -> Self {
        Self {
            pages: Err(detail.to_string()),
            calls: Cell::new(0),
        }
    }
}

impl TextLayerReader for ScriptedText {
    fn read_pages(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractError> {
        self.calls.set(self.calls.get() + 1);
        self.pages.clone().map_err(|detail| ExtractError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail,
        })
    }
}

struct BlankPages {
    count: usize,
    calls: Cell<usize>,
    dpi_seen: Cell<u32>,
}

impl BlankPages {
    fn new(count: usize) -> Self {
        Self {
            count,
            calls: Cell::new(0),
            dpi_seen: Cell::new(0),
        }
    }
}

impl PageRasterizer for BlankPages {
    fn rasterize(&self, _: &Path, dpi: u32) -> Result<Vec<DynamicImage>, ExtractError> {
        self.calls.set(self.calls.get() + 1);
        self.dpi_seen.set(dpi);
        Ok((0..self.count)
            .map(|_| DynamicImage::new_rgb8(16, 12))
            .collect())
    }
}

struct ScriptedOcr {
    installed: bool,
    fail_on_call: Option<usize>,
    version_calls: Cell<usize>,
    calls: Cell<usize>,
    seen: RefCell<Vec<(bool, (u32, u32), OcrSettings)>>,
}

impl ScriptedOcr {
    fn new() -> Self {
        Self {
            installed: true,
            fail_on_call: None,
            version_calls: Cell::new(0),
            calls: Cell::new(0),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn failing_on(page: usize) -> Self {
        Self {
            fail_on_call: Some(page),
            ..Self::new()
        }
    }

    fn missing() -> Self {
        Self {
            installed: false,
            ..Self::new()
        }
    }
}

impl OcrEngine for ScriptedOcr {
    fn name(&self) -> String {
        "scripted-ocr".to_string()
    }

    fn version(&self) -> Result<String, OcrError> {
        self.version_calls.set(self.version_calls.get() + 1);
        if self.installed {
            Ok("5.3.0".to_string())
        } else {
            Err(OcrError::Spawn {
                program: "scripted-ocr".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not installed"),
            })
        }
    }

    fn recognize(&self, image: &DynamicImage, settings: &OcrSettings) -> Result<String, OcrError> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        self.seen.borrow_mut().push((
            matches!(image, DynamicImage::ImageLuma8(_)),
            (image.width(), image.height()),
            settings.clone(),
        ));
        if self.fail_on_call == Some(call) {
            return Err(OcrError::Failed {
                program: "scripted-ocr".into(),
                status: "exit status: 1".into(),
                stderr: "Error in pixReadStream".into(),
            });
        }
        Ok(format!("ocr text of page {call}\n"))
    }
}

#[derive(Default)]
struct EventLog(Mutex<Vec<String>>);

impl EventLog {
    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ExtractionProgressCallback for EventLog {
    fn on_extraction_start(&self, method: ExtractionMethod, total_pages: usize) {
        self.push(format!("start {method} {total_pages}"));
    }
    fn on_fallback(&self, _reason: &FallbackReason) {
        self.push("fallback".into());
    }
    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.push(format!("page {page_num}"));
    }
    fn on_page_complete(&self, page_num: usize, _total: usize, _len: usize) {
        self.push(format!("done {page_num}"));
    }
    fn on_page_error(&self, page_num: usize, _total: usize, _error: &str) {
        self.push(format!("error {page_num}"));
    }
    fn on_extraction_complete(&self, total: usize, ok: usize) {
        self.push(format!("complete {ok}/{total}"));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn pdf_fixture() -> NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    f.write_all(b"%PDF-1.4\n%%EOF\n").unwrap();
    f
}

fn long_text(tag: &str) -> String {
    format!("{tag}: the quick brown fox jumps over the lazy dog, twice over.")
}

fn headers(text: &str) -> Vec<usize> {
    text.lines()
        .filter_map(|l| l.strip_prefix("--- Page "))
        .filter_map(|l| l.strip_suffix(" ---"))
        .map(|n| n.parse().unwrap())
        .collect()
}

fn forced() -> ExtractionConfig {
    ExtractionConfig::builder().force_ocr(true).build().unwrap()
}

// ── Text layer path ──────────────────────────────────────────────────────────

#[test]
fn sufficient_text_layer_never_invokes_ocr() {
    let pdf = pdf_fixture();
    let (a, b) = (long_text("one"), long_text("two"));
    let text = ScriptedText::pages(&[&a, &b]);
    let raster = BlankPages::new(2);
    let ocr = ScriptedOcr::new();

    let out = Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(out.method, ExtractionMethod::TextLayer);
    assert_eq!(out.fallback, None);
    assert_eq!(
        out.text,
        format!("--- Page 1 ---\n{a}\n\n--- Page 2 ---\n{b}\n\n")
    );
    assert_eq!(text.calls.get(), 1);
    assert_eq!(raster.calls.get(), 0);
    assert_eq!(ocr.version_calls.get(), 0);
    assert_eq!(ocr.calls.get(), 0);
}

#[test]
fn text_layer_does_not_need_an_ocr_engine() {
    let pdf = pdf_fixture();
    let body = long_text("only");
    let text = ScriptedText::pages(&[&body]);
    let raster = BlankPages::new(1);
    let ocr = ScriptedOcr::missing();

    let out = Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &ExtractionConfig::default())
        .unwrap();
    assert_eq!(out.method, ExtractionMethod::TextLayer);
}

// ── Fallback to OCR ──────────────────────────────────────────────────────────

#[test]
fn force_ocr_never_reads_text_layer() {
    let pdf = pdf_fixture();
    let body = long_text("ignored");
    let text = ScriptedText::pages(&[&body]);
    let raster = BlankPages::new(3);
    let ocr = ScriptedOcr::new();

    let out = Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &forced())
        .unwrap();

    assert_eq!(text.calls.get(), 0);
    assert_eq!(raster.calls.get(), 1);
    assert_eq!(ocr.calls.get(), 3);
    assert_eq!(out.method, ExtractionMethod::Ocr);
    assert_eq!(out.fallback, Some(FallbackReason::Forced));
    assert_eq!(out.stats.text_layer_duration_ms, 0);
}

#[test]
fn scanned_pdf_falls_back_with_one_header_per_image() {
    let pdf = pdf_fixture();
    let text = ScriptedText::pages(&["", " 12 ", "\n"]);
    let raster = BlankPages::new(4);
    let ocr = ScriptedOcr::new();

    let out = Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(
        out.fallback,
        Some(FallbackReason::Insufficient {
            chars: 2,
            threshold: 50
        })
    );
    assert_eq!(headers(&out.text), vec![1, 2, 3, 4]);
    assert_eq!(out.document.len(), 4);
    assert_eq!(out.stats.total_pages, 4);
    assert!(out.text.contains("--- Page 4 ---\nocr text of page 4\n"));
    assert!(!out.text.contains(" 12 "), "partial text layer must be discarded");
}

#[test]
fn unreadable_text_layer_falls_back() {
    let pdf = pdf_fixture();
    let text = ScriptedText::broken("trailer not found");
    let raster = BlankPages::new(1);
    let ocr = ScriptedOcr::new();

    let out = Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &ExtractionConfig::default())
        .unwrap();

    match out.fallback {
        Some(FallbackReason::Unreadable { ref detail }) => {
            assert!(detail.contains("trailer not found"), "got: {detail}")
        }
        ref other => panic!("expected Unreadable, got {other:?}"),
    }
    assert_eq!(out.text, "--- Page 1 ---\nocr text of page 1\n\n\n");
}

#[test]
fn ocr_sees_preprocessed_pages_and_fixed_settings() {
    let pdf = pdf_fixture();
    let text = ScriptedText::pages(&[]);
    let raster = BlankPages::new(2);
    let ocr = ScriptedOcr::new();
    let config = ExtractionConfig::builder()
        .language("eng+fra")
        .dpi(200)
        .build()
        .unwrap();

    Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &config)
        .unwrap();

    assert_eq!(raster.dpi_seen.get(), 200);
    let seen = ocr.seen.borrow();
    assert_eq!(seen.len(), 2);
    for (is_gray, dims, settings) in seen.iter() {
        assert!(is_gray, "OCR must receive the grayscale preprocessed image");
        assert_eq!(*dims, (16, 12));
        assert_eq!(settings.to_args(), vec!["-l", "eng+fra", "--oem", "1", "--psm", "3"]);
    }
}

#[test]
fn failed_page_keeps_its_header_with_empty_body() {
    let pdf = pdf_fixture();
    let text = ScriptedText::pages(&[]);
    let raster = BlankPages::new(3);
    let ocr = ScriptedOcr::failing_on(2);

    let out = Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &forced())
        .unwrap();

    assert_eq!(headers(&out.text), vec![1, 2, 3]);
    assert!(out.text.contains("--- Page 2 ---\n\n\n--- Page 3 ---"));
    assert_eq!(out.stats.failed_pages, 1);

    let pages = out.document.pages();
    assert_eq!(pages[0].text, "ocr text of page 1\n");
    assert!(pages[1].text.is_empty());
    assert_eq!(pages[1].error.as_ref().map(|e| e.page()), Some(2));
    assert_eq!(pages[2].text, "ocr text of page 3\n");
}

#[test]
fn headers_are_sequential_without_gaps() {
    let pdf = pdf_fixture();
    let text = ScriptedText::pages(&[]);
    let raster = BlankPages::new(12);
    let ocr = ScriptedOcr::failing_on(7);

    let out = Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &forced())
        .unwrap();

    assert_eq!(headers(&out.text), (1..=12).collect::<Vec<_>>());
}

// ── Fatal paths ──────────────────────────────────────────────────────────────

#[test]
fn missing_ocr_engine_is_fatal_before_rasterising() {
    let pdf = pdf_fixture();
    let text = ScriptedText::pages(&[""]);
    let raster = BlankPages::new(2);
    let ocr = ScriptedOcr::missing();

    let err = Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &ExtractionConfig::default())
        .unwrap_err();

    match err {
        ExtractError::OcrEngineUnavailable { ref program, .. } => {
            assert_eq!(program, "scripted-ocr")
        }
        ref other => panic!("expected OcrEngineUnavailable, got {other:?}"),
    }
    assert!(err.to_string().contains("sudo apt-get install tesseract-ocr"));
    assert_eq!(raster.calls.get(), 0);
}

#[test]
fn zero_rendered_pages_is_fatal() {
    let pdf = pdf_fixture();
    let text = ScriptedText::pages(&[]);
    let raster = BlankPages::new(0);
    let ocr = ScriptedOcr::new();

    let err = Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &forced())
        .unwrap_err();
    assert!(matches!(err, ExtractError::NoPagesRendered { .. }));
    assert_eq!(ocr.calls.get(), 0);
}

#[test]
fn missing_input_writes_no_output_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.txt");
    let text = ScriptedText::pages(&[]);
    let raster = BlankPages::new(1);
    let ocr = ScriptedOcr::new();

    let err = Extractor::new(&text, &raster, &ocr)
        .run_to_file(
            &dir.path().join("nope.pdf"),
            Some(&output),
            &ExtractionConfig::default(),
        )
        .unwrap_err();

    assert!(matches!(err, ExtractError::FileNotFound { .. }));
    assert!(!output.exists());
    assert_eq!(text.calls.get(), 0);
    assert_eq!(raster.calls.get(), 0);
}

// ── Output file ──────────────────────────────────────────────────────────────

#[test]
fn output_file_holds_exactly_the_returned_text() {
    let pdf = pdf_fixture();
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.txt");
    let text = ScriptedText::pages(&[]);
    let raster = BlankPages::new(2);
    let ocr = ScriptedOcr::new();

    let out = Extractor::new(&text, &raster, &ocr)
        .run_to_file(pdf.path(), Some(&output), &forced())
        .unwrap();

    assert_eq!(out.saved, SaveOutcome::Saved(output.clone()));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), out.text);
}

#[test]
fn no_output_path_creates_no_file() {
    let pdf = pdf_fixture();
    let dir = TempDir::new().unwrap();
    let text = ScriptedText::pages(&[]);
    let raster = BlankPages::new(1);
    let ocr = ScriptedOcr::new();

    let out = Extractor::new(&text, &raster, &ocr)
        .run_to_file(pdf.path(), None, &forced())
        .unwrap();

    assert_eq!(out.saved, SaveOutcome::NotRequested);
    assert!(!out.text.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn save_failure_still_returns_text() {
    let pdf = pdf_fixture();
    let dir = TempDir::new().unwrap();
    let output: PathBuf = dir.path().join("no-such-dir").join("out.txt");
    let text = ScriptedText::pages(&[]);
    let raster = BlankPages::new(1);
    let ocr = ScriptedOcr::new();

    let out = Extractor::new(&text, &raster, &ocr)
        .run_to_file(pdf.path(), Some(&output), &forced())
        .unwrap();

    assert!(matches!(out.saved, SaveOutcome::Failed { ref path, .. } if *path == output));
    assert_eq!(out.text, "--- Page 1 ---\nocr text of page 1\n\n\n");
}

// ── Progress events ──────────────────────────────────────────────────────────

#[test]
fn progress_events_arrive_in_page_order() {
    let pdf = pdf_fixture();
    let log = Arc::new(EventLog::default());
    let config = ExtractionConfig::builder()
        .progress_callback(log.clone() as Arc<dyn ExtractionProgressCallback>)
        .build()
        .unwrap();
    let text = ScriptedText::pages(&[""]);
    let raster = BlankPages::new(2);
    let ocr = ScriptedOcr::failing_on(2);

    Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &config)
        .unwrap();

    assert_eq!(
        log.events(),
        vec![
            "fallback",
            "start OCR 2",
            "page 1",
            "done 1",
            "page 2",
            "error 2",
            "complete 1/2",
        ]
    );
}

#[test]
fn text_layer_progress_reports_every_page() {
    let pdf = pdf_fixture();
    let log = Arc::new(EventLog::default());
    let config = ExtractionConfig::builder()
        .progress_callback(log.clone() as Arc<dyn ExtractionProgressCallback>)
        .build()
        .unwrap();
    let (a, b) = (long_text("a"), long_text("b"));
    let text = ScriptedText::pages(&[&a, &b]);
    let raster = BlankPages::new(0);
    let ocr = ScriptedOcr::new();

    Extractor::new(&text, &raster, &ocr)
        .run(pdf.path(), &config)
        .unwrap();

    assert_eq!(
        log.events(),
        vec!["start text layer 2", "done 1", "done 2", "complete 2/2"]
    );
}
