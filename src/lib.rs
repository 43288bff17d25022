//! # pdfmd
//!
//! Extract PDF documents to Markdown: direct text first, OCR as a fallback,
//! embedded images saved alongside.
//!
//! ## Why this crate?
//!
//! Most PDFs carry a perfectly good text layer, and for those a direct
//! extraction is fast, exact, and free. Scanned documents and
//! extraction-hostile encodings do not — their pages come out empty or as a
//! handful of stray characters. Instead of choosing one strategy up front,
//! this crate probes each page and falls back to OCR only where the text
//! layer cannot deliver, then merges both worlds into one Markdown document
//! with page delimiters and inline image links.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate the local file (%PDF magic, readability)
//!  ├─ 2. Text     direct text layer + text-object probe (pdfium)
//!  ├─ 3. Policy   decide OCR per page (50-char threshold + probe)
//!  ├─ 4. OCR      rasterise at 300 DPI, greyscale, external tesseract
//!  ├─ 5. Images   embedded-image streams via lopdf, saved to disk
//!  └─ 6. Output   assembled Markdown + per-page results + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfmd::{extract, ExtractConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractConfig::default();
//!     let output = extract("document.pdf", &config).await?;
//!     println!("{}", output.markdown);
//!     eprintln!(
//!         "{} pages, {} via OCR, {} images",
//!         output.stats.total_pages,
//!         output.stats.ocr_pages,
//!         output.stats.images_extracted
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfmd` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfmd = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirements
//!
//! * A pdfium shared library, found via `PDFIUM_LIB_PATH` or the system
//!   loader path.
//! * The `tesseract` binary on `PATH` (or set via
//!   [`ExtractConfigBuilder::tesseract_cmd`]) — only needed when OCR
//!   actually fires.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractConfig, ExtractConfigBuilder, MIN_TEXT_LEN_FOR_NO_OCR};
pub use error::ExtractError;
pub use extract::{extract, extract_sync, extract_to_file, inspect};
pub use output::{DocumentMetadata, ExtractOutput, ExtractStats, ImageRef, PageResult};
pub use progress::{ExtractProgressCallback, NoopProgressCallback, ProgressCallback};
