//! OCR: turn a preprocessed page image into text with tesseract.
//!
//! The engine sits behind [`OcrEngine`] so the orchestrator can be driven by
//! a scripted double in tests. The production engine, [`TesseractCli`], runs
//! the `tesseract` executable once per page:
//!
//! ```text
//! tesseract <page.png> stdout -l <lang> --oem 1 --psm 3
//! ```
//!
//! The page image is staged as a PNG in a temp file that is removed when the
//! call returns, whether it succeeded or not.

use crate::config::OcrSettings;
use image::{DynamicImage, ImageFormat};
use once_cell::sync::Lazy;
use pdfium_locate::{Located, Locator};
use regex::Regex;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;
use tracing::debug;

/// Environment variable holding an explicit tesseract executable (or directory).
pub const TESSERACT_PATH_ENV: &str = "TESSERACT_PATH";

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^tesseract\s+v?(\S+)").unwrap());

/// Failure of a single OCR engine invocation.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("could not stage page image: {0}")]
    Staging(String),

    #[error("unrecognised version output: {0:?}")]
    UnknownVersion(String),
}

/// A text recogniser for single page images.
pub trait OcrEngine {
    /// Name used in diagnostics.
    fn name(&self) -> String {
        "ocr engine".to_string()
    }

    /// Engine version; also serves as the availability probe.
    fn version(&self) -> Result<String, OcrError>;

    /// Recognise the text of one page image.
    fn recognize(&self, image: &DynamicImage, settings: &OcrSettings) -> Result<String, OcrError>;
}

/// The `tesseract` command-line program.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
    located: Located,
}

impl TesseractCli {
    /// Find tesseract: explicit path → `TESSERACT_PATH` → conventional
    /// install directories → `PATH`.
    pub fn locate(explicit: Option<&Path>) -> Self {
        let located = tesseract_locator(explicit).locate();
        let program = located
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("tesseract"));
        debug!("Using tesseract at {}", located.describe());
        Self { program, located }
    }

    /// Use `program` as-is, without any lookup.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        Self {
            located: Located::Explicit(program.clone()),
            program,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn located(&self) -> &Located {
        &self.located
    }

    fn run(&self, command: &mut Command) -> Result<Output, OcrError> {
        let output = command.output().map_err(|source| OcrError::Spawn {
            program: self.name(),
            source,
        })?;
        if !output.status.success() {
            return Err(OcrError::Failed {
                program: self.name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> String {
        self.program.display().to_string()
    }

    fn version(&self) -> Result<String, OcrError> {
        let output = self.run(Command::new(&self.program).arg("--version"))?;
        // 3.x prints the banner on stderr, 4.x and later on stdout.
        let banner = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        parse_version(&banner).ok_or_else(|| OcrError::UnknownVersion(banner.trim().to_string()))
    }

    fn recognize(&self, image: &DynamicImage, settings: &OcrSettings) -> Result<String, OcrError> {
        let mut staged = tempfile::Builder::new()
            .prefix("pdf2txt-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Staging(e.to_string()))?;
        image
            .write_to(staged.as_file_mut(), ImageFormat::Png)
            .map_err(|e| OcrError::Staging(e.to_string()))?;
        staged
            .as_file_mut()
            .flush()
            .map_err(|e| OcrError::Staging(e.to_string()))?;

        let output = self.run(
            Command::new(&self.program)
                .arg(staged.path())
                .arg("stdout")
                .args(settings.to_args()),
        )?;

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text.trim_end_matches('\x0c').to_string())
    }
}

/// Extract the version number from `tesseract --version` output.
pub fn parse_version(banner: &str) -> Option<String> {
    VERSION_RE
        .captures(banner)
        .map(|caps| caps[1].to_string())
}

/// Platform file name of the tesseract executable.
pub fn tesseract_program_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "tesseract.exe"
    } else {
        "tesseract"
    }
}

/// Directories tesseract installers commonly use.
pub fn conventional_tesseract_dirs() -> Vec<PathBuf> {
    let fixed: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Tesseract-OCR",
            r"C:\Program Files (x86)\Tesseract-OCR",
        ]
    } else {
        &["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"]
    };
    fixed.iter().map(PathBuf::from).collect()
}

fn tesseract_locator(explicit: Option<&Path>) -> Locator {
    Locator::new(tesseract_program_name())
        .explicit(explicit)
        .env_var(TESSERACT_PATH_ENV)
        .candidate_dirs(conventional_tesseract_dirs())
}
