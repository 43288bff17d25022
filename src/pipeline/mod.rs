//! Pipeline stages for PDF extraction.
//!
//! Each submodule implements exactly one concern. Keeping stages separate
//! makes each independently testable and lets us swap implementations
//! (e.g. a different OCR engine) without touching other stages.
//!
//! ## Per-page data flow
//!
//! ```text
//! input ──▶ text ──▶ policy ──▶ ocr (conditional) ──▶ images ──▶ assembly
//! (path)  (pdfium)  (decide)    (raster+tesseract)    (lopdf)   (extract.rs)
//! ```
//!
//! 1. [`input`]  — validate the user-supplied path and PDF magic bytes
//! 2. [`text`]   — pdfium session: direct text + text-object probe per page
//! 3. [`policy`] — pure OCR decision and merge rules
//! 4. [`ocr`]    — rasterise one page and run the external tesseract binary
//! 5. [`images`] — independent lopdf session: enumerate and save embedded
//!    images, emitting Markdown links
//!
//! The two document sessions ([`text`] and [`images`]) are deliberately
//! separate libraries opened once each per document: a malformed object
//! table that breaks image enumeration must not take down text extraction.

pub mod images;
pub mod input;
pub mod ocr;
pub mod policy;
pub mod text;
