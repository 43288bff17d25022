//! Extraction entry points and the per-page assembly loop.
//!
//! The loop is strictly sequential: extract direct text, decide OCR, run
//! OCR conditionally, extract images, emit the page block. No page is
//! processed out of order and no page is ever skipped; blank pages get a
//! marker line so the output's page count always matches the document's.
//!
//! pdfium wraps a C++ library that is not safe to call from async
//! contexts, so the whole loop runs inside `spawn_blocking`; the async
//! entry points are thin wrappers.

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::output::{ExtractOutput, ExtractStats, DocumentMetadata, PageResult};
use crate::pipeline::{images::ImageExtractor, input, ocr, policy, text};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Extract a PDF's text and embedded images into a single Markdown string.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input_str` — local filesystem path to a PDF
/// * `config`    — extraction configuration
///
/// # Returns
/// `Ok(ExtractOutput)` whenever the document itself could be processed,
/// even if individual pages, images, or OCR calls degraded into inline
/// notes (check `output.stats.notes`).
///
/// # Errors
/// Returns `Err(ExtractError)` only for document-level failures: missing
/// or unreadable file, not a PDF, corrupt or password-protected document,
/// pdfium unavailable, or an unusable image output directory.
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractConfig,
) -> Result<ExtractOutput, ExtractError> {
    // Validate the input path before anything else so a missing file
    // fails without touching the image output directory.
    let pdf_path = input::resolve_local(input_str.as_ref())?;
    info!("Starting extraction: {}", pdf_path.display());

    let config = config.clone();
    tokio::task::spawn_blocking(move || extract_blocking(&pdf_path, &config))
        .await
        .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractConfig,
) -> Result<ExtractOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Extract a PDF and write the assembled Markdown directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractConfig,
) -> Result<ExtractStats, ExtractError> {
    let output = extract(input_str, config).await?;
    let path = output_path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ExtractError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("md.tmp");
    tokio::fs::write(&tmp_path, &output.markdown)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output.stats)
}

/// Read PDF metadata without processing pages.
///
/// Does not require tesseract or an image output directory.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentMetadata, ExtractError> {
    let pdf_path = input::resolve_local(input_str.as_ref())?;

    tokio::task::spawn_blocking(move || {
        let pdfium = text::bind_pdfium()?;
        let document = text::load_document(&pdfium, &pdf_path, None)?;
        Ok(text::extract_metadata(&document))
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Inspect task panicked: {}", e)))?
}

// ── Blocking implementation ──────────────────────────────────────────────

/// The whole sequential run: open both sessions once, loop pages in order.
fn extract_blocking(
    pdf_path: &Path,
    config: &ExtractConfig,
) -> Result<ExtractOutput, ExtractError> {
    let total_start = Instant::now();

    prepare_image_dir(&config.image_dir)?;

    // Text-layer session (pdfium), opened once.
    let pdfium = text::bind_pdfium()?;
    let document = text::load_document(&pdfium, pdf_path, config.password.as_deref())?;
    let metadata = text::extract_metadata(&document);
    let total_pages = metadata.page_count;
    info!("PDF has {} pages", total_pages);

    // Image-enumeration session (lopdf), opened once, independently.
    let base = input::sanitised_base_name(pdf_path);
    let image_session =
        ImageExtractor::open(pdf_path, &config.image_dir, &config.image_url_prefix);

    if let Some(ref cb) = config.progress_callback {
        cb.on_extract_start(total_pages);
    }

    let pdf_pages = document.pages();
    let mut pages: Vec<PageResult> = Vec::with_capacity(total_pages);
    let mut blocks: Vec<String> = Vec::with_capacity(total_pages);
    let mut ocr_duration_ms: u64 = 0;

    for idx in 0..total_pages {
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(idx + 1, total_pages);
        }

        let page = pdf_pages.get(idx as u16).map_err(|e| {
            ExtractError::Internal(format!("Failed to load page {}: {:?}", idx + 1, e))
        })?;

        // 1. Direct text + text-object probe.
        let probe = text::probe_page(&page, idx);
        let mut page_text = probe.direct_text.clone();
        let mut notes: Vec<String> = Vec::new();

        // 2. OCR decision.
        let ocr_applied =
            policy::should_run_ocr(idx, &probe.direct_text, probe.text_objects, config);

        // 3. Conditional OCR.
        if ocr_applied {
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_ocr(idx + 1, total_pages);
            }
            let ocr_start = Instant::now();
            match ocr::run_page_ocr(&page, idx, config) {
                Ok(t) if !t.is_empty() => {
                    debug!("OCR successful for page {}: {} chars", idx + 1, t.len());
                    page_text = policy::merge_ocr_text(&probe.direct_text, &t);
                }
                Ok(_) => {
                    debug!("OCR for page {} yielded no text", idx + 1);
                }
                Err(ocr::OcrError::NoImage) => {
                    let note = ocr::no_image_note(idx);
                    page_text.push_str(&note);
                    notes.push(note);
                }
                Err(ocr::OcrError::Engine(msg)) => {
                    let note = ocr::engine_error_note(idx, &msg);
                    page_text.push_str(&note);
                    notes.push(note);
                }
            }
            ocr_duration_ms += ocr_start.elapsed().as_millis() as u64;
        }

        // 4. Embedded images.
        let mut parts: Vec<String> = Vec::new();
        if !page_text.is_empty() {
            parts.push(page_text.clone());
        }
        let mut image_refs = Vec::new();
        for result in image_session.extract_page(idx, &base) {
            match result {
                Ok(r) => {
                    parts.push(r.markdown_link());
                    image_refs.push(r);
                }
                Err(note) => {
                    parts.push(note.clone());
                    notes.push(note);
                }
            }
        }

        blocks.push(render_page_block(idx, &parts));

        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(
                idx + 1,
                total_pages,
                page_text.len(),
                ocr_applied,
                image_refs.len(),
            );
        }

        pages.push(PageResult {
            page_num: idx + 1,
            text: page_text,
            ocr_applied,
            images: image_refs,
            notes,
        });
    }

    let markdown = blocks.join("\n");

    let stats = ExtractStats {
        total_pages,
        ocr_pages: pages.iter().filter(|p| p.ocr_applied).count(),
        blank_pages: pages.iter().filter(|p| p.is_blank()).count(),
        images_extracted: pages.iter().map(|p| p.images.len()).sum(),
        notes: pages.iter().map(|p| p.notes.len()).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        ocr_duration_ms,
    };

    info!(
        "Extraction complete: {} pages ({} OCR, {} blank, {} images) in {}ms",
        stats.total_pages,
        stats.ocr_pages,
        stats.blank_pages,
        stats.images_extracted,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_extract_complete(total_pages, stats.ocr_pages, stats.images_extracted);
    }

    Ok(ExtractOutput {
        markdown,
        pages,
        metadata,
        stats,
    })
}

/// Render one page's delimited block from its non-empty content parts.
fn render_page_block(page_index: usize, parts: &[String]) -> String {
    let parts: Vec<&str> = parts
        .iter()
        .map(|s| s.as_str())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        format!(
            "\n--- Page {} --- (Blank or no extractable content)",
            page_index + 1
        )
    } else {
        format!("\n--- Page {} ---\n{}", page_index + 1, parts.join("\n"))
    }
}

/// Create the image output directory and verify it is writable with a
/// probe file, before any page is processed.
fn prepare_image_dir(dir: &Path) -> Result<(), ExtractError> {
    let fail = |source: std::io::Error| ExtractError::ImageDirUnavailable {
        path: dir.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(fail)?;
    let probe = dir.join(".pdfmd_write_test");
    std::fs::write(&probe, b"test").map_err(fail)?;
    std::fs::remove_file(&probe).map_err(fail)?;
    debug!("Verified writable image directory: {}", dir.display());
    Ok(())
}
