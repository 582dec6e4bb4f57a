//! Input validation: make sure the PDF path points at a readable file.
//!
//! This is the only stage that runs before any backend is touched, so a
//! typo in the path aborts the run before pdfium or tesseract are loaded and
//! before any output file is created.

use crate::error::ExtractError;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Validate a local PDF path: it must exist, be a regular file and be readable.
///
/// A missing `%PDF` signature is only logged; the text-layer reader and the
/// rasteriser decide for themselves whether the file is usable.
pub fn validate_input(path: &Path) -> Result<PathBuf, ExtractError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(ExtractError::FileNotFound { path });
    }
    if !path.is_file() {
        return Err(ExtractError::NotAFile { path });
    }

    match File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                warn!(
                    "'{}' does not start with %PDF (got {:?}); trying anyway",
                    path.display(),
                    magic
                );
            }
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound { path });
        }
    }

    debug!("Validated input PDF: {}", path.display());
    Ok(path)
}
