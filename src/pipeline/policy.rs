//! OCR decision policy and merge rules.
//!
//! Both functions here are pure so the full decision table is unit-tested
//! without touching pdfium or tesseract.
//!
//! ## The text-object probe
//!
//! A page with minimal direct text could be a scanned page (worth OCR) or
//! a pure-graphic page such as a cover illustration (not worth OCR). The
//! text layer is asked how many text-like objects the page carries:
//! objects present but no extracted characters usually means an unusual
//! encoding or a scan with an invisible text layer — OCR it. No objects at
//! all means there is simply nothing to read. When the capability query
//! itself is unavailable (`None`), fall back to OCR only on completely
//! empty pages.

use crate::config::{ExtractConfig, MIN_TEXT_LEN_FOR_NO_OCR};

/// How OCR output is combined with the page's direct text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrMerge {
    /// Direct text was below the threshold: OCR output replaces it.
    Replace,
    /// Direct text was substantial: OCR output is appended after a
    /// separator so neither is lost.
    Append,
}

/// Separator inserted between direct text and appended OCR text.
pub const OCR_APPEND_SEPARATOR: &str = "\n\n--- OCR Text ---\n";

/// Decide whether OCR should run on a page.
///
/// `text_objects` is the capability probe result: `Some(count)` of
/// text-like objects on the page, or `None` when the text layer cannot
/// answer.
pub fn should_run_ocr(
    page_index: usize,
    direct_text: &str,
    text_objects: Option<usize>,
    config: &ExtractConfig,
) -> bool {
    if config.force_ocr_all {
        return true;
    }
    if config.force_ocr_pages.contains(&page_index) {
        return true;
    }
    // Threshold counts characters, not bytes; multibyte text must not
    // inflate past it.
    if direct_text.chars().count() >= MIN_TEXT_LEN_FOR_NO_OCR {
        return false;
    }
    match text_objects {
        // Minimal text but text-like objects exist: likely a scan or an
        // extraction-hostile encoding.
        Some(n) => n > 0,
        // Probe unavailable: only completely empty pages are worth a try.
        None => direct_text.is_empty(),
    }
}

/// Pick the merge mode for a page where OCR ran.
///
/// Keys on the direct text's length against the threshold, not on why OCR
/// was triggered: a long page forced into OCR via the explicit page list
/// still gets append treatment so its direct text is never discarded.
pub fn merge_mode(direct_text: &str) -> OcrMerge {
    if direct_text.chars().count() < MIN_TEXT_LEN_FOR_NO_OCR {
        OcrMerge::Replace
    } else {
        OcrMerge::Append
    }
}

/// Apply the merge policy. `ocr_text` must be non-empty (empty OCR output
/// leaves the direct text untouched; callers skip the merge entirely).
pub fn merge_ocr_text(direct_text: &str, ocr_text: &str) -> String {
    match merge_mode(direct_text) {
        OcrMerge::Replace => ocr_text.to_string(),
        OcrMerge::Append => format!("{direct_text}{OCR_APPEND_SEPARATOR}{ocr_text}"),
    }
}
