//! OCR engine adapter: rasterise one page and run the external tesseract
//! binary on it.
//!
//! Tesseract is invoked as a child process (`tesseract <image> stdout -l
//! <lang>`) rather than linked, which keeps the OCR engine a replaceable
//! black box and avoids a native build dependency. The rasterised page is
//! converted to greyscale before recognition — tesseract's binarisation is
//! more stable without colour noise.
//!
//! Failures here never abort a page: the caller turns them into inline
//! bracketed notes and keeps whatever direct text it already has.

use crate::config::ExtractConfig;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::process::Command;
use tracing::{debug, warn};

/// Why an OCR attempt produced no usable text.
#[derive(Debug)]
pub enum OcrError {
    /// Rasterisation yielded no image for the page.
    NoImage,
    /// The OCR engine failed to launch or returned an error.
    Engine(String),
}

/// Inline note for a page whose rasterisation produced no image.
pub fn no_image_note(page_index: usize) -> String {
    format!(
        "\n[OCR attempted but no image returned for page {}]",
        page_index + 1
    )
}

/// Inline note for an OCR engine failure.
pub fn engine_error_note(page_index: usize, detail: &str) -> String {
    format!("\n[OCR error on page {}: {}]", page_index + 1, detail)
}

/// Pixel edge length for a page dimension in points at the given DPI.
fn raster_target(points: f32, dpi: u32) -> i32 {
    (points * dpi as f32 / 72.0).round() as i32
}

/// Rasterise `page` at the configured DPI and run tesseract on it.
///
/// Returns the recognised text, trimmed. An empty string is a valid
/// outcome (the engine saw nothing it could read), distinct from the
/// error cases.
pub fn run_page_ocr(
    page: &PdfPage,
    page_index: usize,
    config: &ExtractConfig,
) -> Result<String, OcrError> {
    let width_px = raster_target(page.width().value, config.ocr_dpi);
    let height_px = raster_target(page.height().value, config.ocr_dpi);
    if width_px <= 0 || height_px <= 0 {
        return Err(OcrError::NoImage);
    }

    let render_config = PdfRenderConfig::new()
        .set_target_width(width_px)
        .set_maximum_height(height_px);

    let bitmap = page.render_with_config(&render_config).map_err(|e| {
        warn!("Rasterisation failed for page {}: {:?}", page_index + 1, e);
        OcrError::NoImage
    })?;

    let grey: DynamicImage = bitmap.as_image().grayscale();
    debug!(
        "Page {} rasterised for OCR: {}x{} px at {} DPI",
        page_index + 1,
        grey.width(),
        grey.height(),
        config.ocr_dpi
    );

    let scratch = tempfile::tempdir()
        .map_err(|e| OcrError::Engine(format!("scratch dir unavailable: {e}")))?;
    let png_path = scratch.path().join("page.png");
    grey.save(&png_path)
        .map_err(|e| OcrError::Engine(format!("failed to write page image: {e}")))?;

    let output = Command::new(&config.tesseract_cmd)
        .arg(&png_path)
        .arg("stdout")
        .args(["-l", &config.ocr_language])
        .output()
        .map_err(|e| {
            OcrError::Engine(format!(
                "failed to launch '{}': {e}",
                config.tesseract_cmd.display()
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OcrError::Engine(format!(
            "tesseract exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("OCR page {}: {} chars recognised", page_index + 1, text.len());
    Ok(text)
}
