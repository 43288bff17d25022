//! Text-layer session: direct text extraction and the text-object probe.
//!
//! One pdfium document handle serves the whole run — opened once in the
//! page loop, never reopened per page. pdfium wraps a C++ library with
//! thread-local state, so every call in this module runs on the blocking
//! thread the page loop owns (see `extract.rs`).

use crate::error::ExtractError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// What the text layer knows about one page before any OCR decision.
#[derive(Debug, Clone)]
pub struct PageProbe {
    /// Direct-extracted text, trimmed. Possibly empty.
    pub direct_text: String,
    /// Count of text-like objects on the page, or `None` when the text
    /// layer cannot answer the capability query.
    pub text_objects: Option<usize>,
}

/// Bind to a pdfium library, preferring `PDFIUM_LIB_PATH` when set.
pub fn bind_pdfium() -> Result<Pdfium, ExtractError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(dir) if !dir.is_empty() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
                .or_else(|_| Pdfium::bind_to_system_library())
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

/// Open the document for text extraction, mapping pdfium's load failures
/// to typed errors.
pub fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ExtractError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ExtractError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ExtractError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Probe a page: direct text plus the text-object capability query.
pub fn probe_page(page: &PdfPage, page_index: usize) -> PageProbe {
    let direct_text = page
        .text()
        .map(|t| t.all())
        .unwrap_or_default()
        .trim()
        .to_string();

    let text_objects = text_object_count(page);

    debug!(
        "Page {}: {} chars direct text, text objects: {:?}",
        page_index + 1,
        direct_text.len(),
        text_objects
    );

    PageProbe {
        direct_text,
        text_objects,
    }
}

/// Count text-like objects on the page.
///
/// pdfium can always walk the object list, so this returns `Some` here;
/// the `Option` models collaborators that cannot answer, which the policy
/// handles as "unknown".
fn text_object_count(page: &PdfPage) -> Option<usize> {
    Some(
        page.objects()
            .iter()
            .filter(|o| o.object_type() == PdfPageObjectType::Text)
            .count(),
    )
}

/// Read document metadata without processing page content.
pub fn extract_metadata(document: &PdfDocument) -> DocumentMetadata {
    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}
