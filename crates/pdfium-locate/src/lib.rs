//! # pdfium-locate
//!
//! Resolve where an external tool lives, then bind
//! [PDFium](https://pdfium.googlesource.com/pdfium/) from there.
//!
//! ## How it works
//!
//! A [`Locator`] tries, in order:
//!
//! 1. an explicit override (a file, or a directory containing the file);
//! 2. an environment variable holding the same kind of override;
//! 3. a short ordered list of conventional install directories;
//! 4. nothing — the caller falls back to the ambient search path
//!    (`PATH`, the dynamic loader's default directories).
//!
//! [`bind_pdfium`] runs the PDFium-specific locator and binds the library,
//! falling back to [`Pdfium::bind_to_system_library`] when no file was found.
//! The same [`Locator`] is reused by callers for executables such as
//! `tesseract`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pdfium_locate::{bind_pdfium, Locator};
//!
//! let (pdfium, located) = bind_pdfium(None).expect("PDFium unavailable");
//! eprintln!("PDFium bound from {}", located.describe());
//!
//! let tesseract = Locator::new("tesseract")
//!     .env_var("TESSERACT_PATH")
//!     .candidate_dirs(["/opt/homebrew/bin".into(), "/usr/bin".into()])
//!     .locate();
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PDFIUM_LIB_PATH` — path to an existing pdfium library (or its directory).
//! - `PDFIUM_AUTO_CACHE_DIR` — override the pdf2md pdfium cache directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, warn};

// ── Public constants ─────────────────────────────────────────────────────────

/// The pdfium-binaries release tag whose cache directory is searched.
pub const PDFIUM_VERSION: &str = "7690";

/// Environment variable holding an explicit pdfium library location.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by pdfium-locate operations.
#[derive(Error, Debug)]
pub enum PdfiumLocateError {
    /// A library file was found but `pdfium-render` could not load it.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    /// No file in any known location, and the system loader failed too.
    #[error("PDFium not found (searched: {searched}); system library lookup failed: {reason}")]
    NotFound { searched: String, reason: String },
}

// ── Locator ──────────────────────────────────────────────────────────────────

/// Where a [`Locator`] found its tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// From the explicit override passed by the caller.
    Explicit(PathBuf),
    /// From the configured environment variable.
    Environment(PathBuf),
    /// From one of the conventional install directories.
    Conventional(PathBuf),
    /// Not found on disk; rely on the ambient search path.
    SearchPath,
}

impl Located {
    /// The resolved file, or `None` when the search path must be used.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Located::Explicit(p) | Located::Environment(p) | Located::Conventional(p) => Some(p),
            Located::SearchPath => None,
        }
    }

    /// Short human-readable origin, for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            Located::Explicit(p) => format!("{} (explicit)", p.display()),
            Located::Environment(p) => format!("{} (environment)", p.display()),
            Located::Conventional(p) => p.display().to_string(),
            Located::SearchPath => "system search path".to_string(),
        }
    }
}

/// Ordered lookup strategy for one external file.
#[derive(Debug, Clone)]
pub struct Locator {
    file_name: OsString,
    explicit: Option<PathBuf>,
    env_var: Option<String>,
    candidate_dirs: Vec<PathBuf>,
}

impl Locator {
    /// A locator for `file_name` (e.g. `libpdfium.so`, `tesseract.exe`).
    pub fn new(file_name: impl Into<OsString>) -> Self {
        Self {
            file_name: file_name.into(),
            explicit: None,
            env_var: None,
            candidate_dirs: Vec::new(),
        }
    }

    /// Explicit override: the file itself or a directory containing it.
    pub fn explicit(mut self, path: Option<&Path>) -> Self {
        self.explicit = path.map(Path::to_path_buf);
        self
    }

    /// Environment variable consulted after the explicit override.
    pub fn env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = Some(name.into());
        self
    }

    /// Conventional install directories, searched in the given order.
    pub fn candidate_dirs<I>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.candidate_dirs.extend(dirs);
        self
    }

    /// Name of the file being looked for.
    pub fn file_name(&self) -> &Path {
        Path::new(&self.file_name)
    }

    /// Every concrete path the locator would probe, in order.
    pub fn searched(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(ref p) = self.explicit {
            paths.push(p.clone());
        }
        if let Some(v) = self.env_override() {
            paths.push(v);
        }
        paths.extend(self.candidate_dirs.iter().map(|d| d.join(&self.file_name)));
        paths
    }

    /// Run the lookup.
    ///
    /// An override pointing nowhere is logged and skipped rather than
    /// treated as an error; the remaining steps still run.
    pub fn locate(&self) -> Located {
        if let Some(ref p) = self.explicit {
            if let Some(found) = self.resolve_override(p) {
                debug!("{:?}: using explicit {}", self.file_name, found.display());
                return Located::Explicit(found);
            }
            warn!(
                "{:?}: override '{}' not found; searching elsewhere",
                self.file_name,
                p.display()
            );
        }

        if let Some(p) = self.env_override() {
            if let Some(found) = self.resolve_override(&p) {
                debug!("{:?}: using {} from environment", self.file_name, found.display());
                return Located::Environment(found);
            }
            warn!(
                "{:?}: {} points to '{}', which does not exist",
                self.file_name,
                self.env_var.as_deref().unwrap_or_default(),
                p.display()
            );
        }

        for dir in &self.candidate_dirs {
            let candidate = dir.join(&self.file_name);
            if candidate.is_file() {
                debug!("{:?}: found at {}", self.file_name, candidate.display());
                return Located::Conventional(candidate);
            }
        }

        debug!("{:?}: falling back to the system search path", self.file_name);
        Located::SearchPath
    }

    fn env_override(&self) -> Option<PathBuf> {
        let name = self.env_var.as_deref()?;
        std::env::var_os(name)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn resolve_override(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        if path.is_dir() {
            let inner = path.join(&self.file_name);
            if inner.is_file() {
                return Some(inner);
            }
        }
        None
    }
}

// ── PDFium specifics ─────────────────────────────────────────────────────────

/// Platform file name of the pdfium shared library.
pub fn pdfium_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "pdfium.dll"
    } else if cfg!(target_os = "macos") {
        "libpdfium.dylib"
    } else {
        "libpdfium.so"
    }
}

/// Per-version cache directory used by pdf2md's pdfium downloader.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/pdf2md/pdfium-{VERSION}/`
/// - **Linux**: `~/.cache/pdf2md/pdfium-{VERSION}/`
/// - **Windows**: `%LOCALAPPDATA%\pdf2md\pdfium-{VERSION}\`
///
/// Override by setting `PDFIUM_AUTO_CACHE_DIR`.
pub fn pdfium_cache_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var("PDFIUM_AUTO_CACHE_DIR") {
        return PathBuf::from(override_dir).join(format!("pdfium-{PDFIUM_VERSION}"));
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("pdf2md").join(format!("pdfium-{PDFIUM_VERSION}"))
}

/// Conventional directories that commonly hold the pdfium library.
pub fn conventional_pdfium_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![pdfium_cache_dir()];

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    let fixed: &[&str] = if cfg!(target_os = "windows") {
        &[r"C:\Program Files\PDFium\bin", r"C:\pdfium\bin"]
    } else if cfg!(target_os = "macos") {
        &["/opt/homebrew/lib", "/usr/local/lib"]
    } else {
        &["/usr/local/lib", "/usr/lib", "/usr/lib/x86_64-linux-gnu", "/opt/pdfium/lib"]
    };
    dirs.extend(fixed.iter().map(PathBuf::from));
    dirs
}

/// The locator used for pdfium: override → `PDFIUM_LIB_PATH` → conventional dirs.
pub fn pdfium_locator(explicit: Option<&Path>) -> Locator {
    Locator::new(pdfium_library_name())
        .explicit(explicit)
        .env_var(PDFIUM_LIB_PATH_ENV)
        .candidate_dirs(conventional_pdfium_dirs())
}

/// Locate and bind pdfium.
///
/// Returns the bound [`Pdfium`] together with where it came from.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<(Pdfium, Located), PdfiumLocateError> {
    let locator = pdfium_locator(explicit);
    let located = locator.locate();

    match located.path() {
        Some(path) => bind_pdfium_from_path(path).map(|pdfium| (pdfium, located.clone())),
        None => Pdfium::bind_to_system_library()
            .map(|bindings| (Pdfium::new(bindings), Located::SearchPath))
            .map_err(|e| PdfiumLocateError::NotFound {
                searched: locator
                    .searched()
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                reason: e.to_string(),
            }),
    }
}

/// Binds to a PDFium library at an explicit `path`.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumLocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"stub").unwrap();
    }

    #[test]
    fn explicit_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("tool.bin");
        touch(&lib);

        let located = Locator::new("tool.bin")
            .explicit(Some(&lib))
            .candidate_dirs([dir.path().to_path_buf()])
            .locate();
        assert_eq!(located, Located::Explicit(lib));
    }

    #[test]
    fn explicit_directory_is_joined_with_file_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("tool.bin"));

        let located = Locator::new("tool.bin").explicit(Some(dir.path())).locate();
        assert_eq!(located, Located::Explicit(dir.path().join("tool.bin")));
    }

    #[test]
    fn missing_override_falls_through_to_candidates() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("tool.bin"));

        let located = Locator::new("tool.bin")
            .explicit(Some(Path::new("/definitely/not/here/tool.bin")))
            .candidate_dirs([
                PathBuf::from("/definitely/not/here"),
                dir.path().to_path_buf(),
            ])
            .locate();
        assert_eq!(located, Located::Conventional(dir.path().join("tool.bin")));
    }

    #[test]
    fn env_var_used_when_no_explicit_override() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("tool.bin");
        touch(&lib);

        let var = "PDFIUM_LOCATE_TEST_ENV_OVERRIDE";
        std::env::set_var(var, &lib);
        let located = Locator::new("tool.bin").env_var(var).locate();
        std::env::remove_var(var);

        assert_eq!(located, Located::Environment(lib));
    }

    #[test]
    fn nothing_found_means_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let located = Locator::new("tool.bin")
            .env_var("PDFIUM_LOCATE_TEST_ENV_UNSET")
            .candidate_dirs([dir.path().to_path_buf()])
            .locate();
        assert_eq!(located, Located::SearchPath);
        assert!(located.path().is_none());
    }

    #[test]
    fn searched_lists_probes_in_order() {
        let locator = Locator::new("tool.bin")
            .explicit(Some(Path::new("/x/override")))
            .candidate_dirs([PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(
            locator.searched(),
            vec![
                PathBuf::from("/x/override"),
                PathBuf::from("/a/tool.bin"),
                PathBuf::from("/b/tool.bin"),
            ]
        );
    }

    #[test]
    fn cache_dir_is_deterministic() {
        let d1 = pdfium_cache_dir();
        let d2 = pdfium_cache_dir();
        assert_eq!(d1, d2);
        assert!(d1.to_str().unwrap().contains("pdf2md"));
        assert!(d1.to_str().unwrap().contains(PDFIUM_VERSION));
    }

    #[test]
    fn pdfium_dirs_start_with_cache() {
        let dirs = conventional_pdfium_dirs();
        assert_eq!(dirs.first(), Some(&pdfium_cache_dir()));
        assert!(dirs.len() > 2);
    }

    #[test]
    fn library_name_matches_platform() {
        let name = pdfium_library_name();
        assert!(name.contains("pdfium"));
        assert_eq!(pdfium_locator(None).file_name(), Path::new(name));
    }
}
