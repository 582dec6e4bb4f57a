//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements exactly one step; [`crate::extract`] wires them
//! together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ text ──(enough text)──────────────────────────▶ document
//!             │
//!             └──(scan / unreadable / forced)──▶ render ──▶ preprocess ──▶ ocr ──▶ document
//! ```
//!
//! 1. [`input`]      — check the path is a readable file before anything loads
//! 2. [`pdfium`]     — bind the pdfium library shared by `text` and `render`
//! 3. [`text`]       — read the embedded text layer and judge whether it suffices
//! 4. [`render`]     — rasterise every page at the configured DPI
//! 5. [`preprocess`] — grayscale, contrast, sharpness and brightness enhancement
//! 6. [`ocr`]        — run tesseract on each enhanced page image
//!
//! The stages that touch external libraries are traits ([`text::TextLayerReader`],
//! [`render::PageRasterizer`], [`ocr::OcrEngine`]) so the orchestrator can be
//! exercised without pdfium or tesseract installed.

pub mod input;
pub mod ocr;
pub mod pdfium;
pub mod preprocess;
pub mod render;
pub mod text;
