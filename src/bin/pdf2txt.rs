//! CLI binary for edgequake-pdf2txt.
//!
//! A thin shim over the library crate that maps positional arguments and
//! flags to `ExtractionConfig`, runs the extraction and prints a summary and
//! a bounded preview.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2txt::config::{
    DEFAULT_DPI, DEFAULT_LANGUAGE, DEFAULT_MIN_TEXT_CHARS, DEFAULT_PREVIEW_CHARS,
};
use edgequake_pdf2txt::{
    check_dependencies, extract_to_file, ExtractionConfig, ExtractionMethod,
    ExtractionProgressCallback, FallbackReason, ProgressCallback, SaveOutcome,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the PDF is opened, then a
/// page counter once the extraction method and page count are known.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the page currently being OCR'd.
    page_started: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading text layer…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, prefix: &str, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(prefix.to_string());
        self.bar.reset_eta();
    }

    fn page_elapsed_secs(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, method: ExtractionMethod, total_pages: usize) {
        let prefix = match method {
            ExtractionMethod::TextLayer => "Reading",
            ExtractionMethod::Ocr => "OCR",
        };
        self.activate_bar(prefix, total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_pages} pages via {method}…"))
        ));
    }

    fn on_fallback(&self, reason: &FallbackReason) {
        self.bar.set_prefix("Rendering");
        self.bar.set_message("Rasterising pages…");
        self.bar
            .println(format!("{} Falling back to OCR: {}", cyan("◆"), dim(&reason.to_string())));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, text_len: usize) {
        let secs = self.page_elapsed_secs();
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{text_len:>5} chars")),
            dim(&format!("{secs:.2}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let secs = self.page_elapsed_secs();
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{secs:.2}s")),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, total_pages: usize, success_count: usize) {
        let failed = total_pages.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} pages extracted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages extracted  ({} failed OCR, kept as empty pages)",
                if failed == total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract and preview (text layer first, OCR if needed)
  pdf2txt document.pdf

  # Save to a file
  pdf2txt document.pdf output.txt

  # French + English OCR, forced even if a text layer exists
  pdf2txt document.pdf output.txt eng+fra True

  # Don't save, but force OCR
  pdf2txt scan.pdf None eng true

  # Print the whole text instead of a preview
  pdf2txt --stdout document.pdf > document.txt

  # Check that pdfium and tesseract are installed
  pdf2txt --check

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  PDFIUM_AUTO_CACHE_DIR   Override the pdfium cache directory searched
  TESSERACT_PATH          Path to the tesseract executable (file or directory)
  RUST_LOG                Override log filtering (e.g. edgequake_pdf2txt=debug)

SETUP:
  Tesseract OCR is only needed for scanned PDFs:
    - Mac:     brew install tesseract
    - Windows: https://github.com/UB-Mannheim/tesseract/wiki
    - Linux:   sudo apt-get install tesseract-ocr
  Extra languages: install the matching traineddata (e.g. tesseract-ocr-fra).
"#;

/// Extract text from PDF files, with Tesseract OCR for scanned documents.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "Extract text from PDF files, with Tesseract OCR for scanned documents",
    long_about = "Extract text from PDF documents. The embedded text layer is used when it holds \
real content; otherwise every page is rendered at 300 DPI, enhanced, and read with Tesseract OCR. \
Output is plain text with a `--- Page N ---` header before each page.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to extract text from.
    #[arg(required_unless_present = "check")]
    input: Option<PathBuf>,

    /// Save the extracted text here. The literal `None` disables saving.
    output: Option<String>,

    /// Tesseract language code(s), e.g. eng or eng+fra.
    #[arg(default_value = DEFAULT_LANGUAGE)]
    lang: String,

    /// `true` (any case) to force OCR even when a text layer exists.
    force_ocr: Option<String>,

    /// Rendering DPI for OCR (72–600).
    #[arg(long, env = "PDF2TXT_DPI", default_value_t = DEFAULT_DPI,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// A text layer must hold more than this many characters to be used.
    #[arg(long, env = "PDF2TXT_MIN_TEXT_CHARS", default_value_t = DEFAULT_MIN_TEXT_CHARS)]
    min_text_chars: usize,

    /// pdfium library file or directory (default: PDFIUM_LIB_PATH, then common locations).
    #[arg(long)]
    pdfium_lib: Option<PathBuf>,

    /// tesseract executable or directory (default: TESSERACT_PATH, then common locations).
    #[arg(long)]
    tesseract: Option<PathBuf>,

    /// Characters of text shown in the preview.
    #[arg(long, env = "PDF2TXT_PREVIEW_CHARS", default_value_t = DEFAULT_PREVIEW_CHARS)]
    preview_chars: usize,

    /// Print the full text to stdout instead of the preview.
    #[arg(long)]
    stdout: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TXT_QUIET")]
    quiet: bool,

    /// Check that pdfium and tesseract are available, then exit.
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.check;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Dependency check mode ────────────────────────────────────────────
    if cli.check {
        let config = build_config(&cli, None)?;
        let report = check_dependencies(&config);
        print!("{report}");
        if !report.is_ready() {
            anyhow::bail!("Some dependencies are missing");
        }
        println!("\nAll dependencies loaded successfully!");
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("A PDF path is required")?;
    let output_path = parse_output(cli.output.as_deref());

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    if !cli.quiet {
        let rule = "=".repeat(60);
        eprintln!("\n{rule}");
        eprintln!("{}", bold(&format!("PDF TEXT EXTRACTION: {}", display_name(&input))));
        eprintln!("{rule}");
    }

    // ── Run extraction ───────────────────────────────────────────────────
    let output = extract_to_file(&input, output_path.as_deref(), &config)
        .context("Extraction failed")?;

    match &output.saved {
        SaveOutcome::Saved(path) => {
            if !cli.quiet {
                eprintln!("\nSaved extracted text to: {}", bold(&path.display().to_string()));
            }
        }
        SaveOutcome::Failed { path, reason } => {
            eprintln!(
                "\n{} Error saving text to '{}': {}",
                red("✗"),
                path.display(),
                reason
            );
        }
        SaveOutcome::NotRequested => {}
    }

    if !cli.quiet {
        let rule = "-".repeat(60);
        eprintln!("\n{rule}");
        eprintln!(
            "EXTRACTION COMPLETE! Total time: {:.2} seconds",
            output.stats.total_duration_ms as f64 / 1000.0
        );
        eprintln!("Total extracted text length: {} characters", output.char_count());
        eprintln!(
            "{}",
            dim(&format!(
                "Method: {}  ·  {} pages  ·  {} failed",
                output.method, output.stats.total_pages, output.stats.failed_pages
            ))
        );
        eprintln!("{rule}");
    }

    // ── Text ─────────────────────────────────────────────────────────────
    if cli.stdout {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.text.as_bytes())
            .context("Failed to write to stdout")?;
    } else if !cli.quiet {
        let rule = "=".repeat(60);
        println!("\nExtracted Text Preview:");
        println!("{rule}");
        println!("{}", output.preview(cli.preview_chars));
        println!("{rule}");
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .dpi(cli.dpi)
        .language(cli.lang.as_str())
        .force_ocr(cli.force_ocr.as_deref().is_some_and(parse_force_flag))
        .min_text_chars(cli.min_text_chars);

    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path);
    }
    if let Some(ref path) = cli.tesseract {
        builder = builder.tesseract_path(path);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Only `true`, in any letter case, enables forced OCR.
fn parse_force_flag(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}

/// The second positional argument: a path, or `None`/empty for "don't save".
fn parse_output(s: Option<&str>) -> Option<PathBuf> {
    match s {
        None | Some("") | Some("None") => None,
        Some(path) => Some(PathBuf::from(path)),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
