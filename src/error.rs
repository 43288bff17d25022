//! Error types for the pdfmd library.
//!
//! Only document-level failures are errors here. Everything below the
//! document level — a single bad embedded image, an OCR engine hiccup, a
//! page whose object table will not enumerate — degrades into an inline
//! bracketed note inside the assembled Markdown and never aborts the run.
//! [`ExtractError`] is therefore deliberately small: if you get an `Err`,
//! you got nothing; if you get an `Ok`, you got every page.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfmd library.
///
/// Sub-document failures (one image, one page's image table, one OCR call)
/// are not represented here; they appear as bracketed diagnostic notes in
/// the output text so the rest of the document still comes through.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Rendering dependency ──────────────────────────────────────────────
    /// Could not bind to a pdfium library. Without it there is no text
    /// layer and no rasterisation, so the whole run short-circuits.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install a pdfium build for your platform, or point at an existing copy:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium\n\
  • Or place libpdfium next to the executable.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// The image output directory could not be created or is not writable.
    #[error("Image output directory '{path}' is unavailable: {source}\nCheck permissions on the parent directory.")]
    ImageDirUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
