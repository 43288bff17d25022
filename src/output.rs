//! Output types: per-page results, image references, run statistics.
//!
//! Everything here is plain data and serde-serialisable so the CLI's
//! `--json` mode and any embedding service can pass results straight
//! through without re-shaping them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The result of one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOutput {
    /// The assembled Markdown-ish document: per-page text and image links
    /// joined in physical page order with `--- Page N ---` delimiters.
    pub markdown: String,

    /// Per-page results in page order, one entry per physical page.
    pub pages: Vec<PageResult>,

    /// Document metadata read from the PDF info dictionary.
    pub metadata: DocumentMetadata,

    /// Run statistics.
    pub stats: ExtractStats,
}

impl ExtractOutput {
    /// URLs of every image referenced by the assembled document, in
    /// extraction order.
    pub fn image_urls(&self) -> Vec<String> {
        self.pages
            .iter()
            .flat_map(|p| p.images.iter().map(|i| i.url.clone()))
            .collect()
    }
}

/// Result of processing a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,

    /// Final page text after the OCR merge policy was applied. May be
    /// empty for blank or pure-graphic pages.
    pub text: String,

    /// Whether OCR ran on this page.
    pub ocr_applied: bool,

    /// Embedded images extracted from this page, in enumeration order.
    pub images: Vec<ImageRef>,

    /// Inline diagnostic notes emitted while processing this page
    /// (OCR failures, per-image errors). Also present verbatim inside the
    /// assembled Markdown.
    pub notes: Vec<String>,
}

impl PageResult {
    /// True when the page produced neither text nor images nor notes —
    /// rendered as the blank-page marker in the assembled document.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && self.images.is_empty() && self.notes.is_empty()
    }
}

/// A single embedded image saved to disk.
///
/// Never mutated after creation; the file persists beyond the run
/// (cleanup is the caller's concern).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    /// 0-indexed page the image was found on.
    pub page_index: usize,

    /// 1-indexed sequence number within the page.
    pub index: usize,

    /// Absolute or config-relative path the image was written to.
    pub file_path: PathBuf,

    /// Externally resolvable URL used in the Markdown link.
    pub url: String,

    /// File extension derived from the image's native encoding
    /// ("jpg", "jp2", or "png" for re-encoded raster data).
    pub ext: String,
}

impl ImageRef {
    /// The Markdown image link emitted into the assembled document.
    pub fn markdown_link(&self) -> String {
        format!(
            "\n\n![Page {} Image {}]({})\n",
            self.page_index + 1,
            self.index,
            self.url
        )
    }
}

/// Document metadata extracted from the PDF, without processing pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Statistics for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractStats {
    /// Total physical pages in the document.
    pub total_pages: usize,
    /// Pages on which OCR ran.
    pub ocr_pages: usize,
    /// Pages rendered as the blank-page marker.
    pub blank_pages: usize,
    /// Embedded images successfully written to disk.
    pub images_extracted: usize,
    /// Inline diagnostic notes emitted across all pages.
    pub notes: usize,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
    /// Portion of the run spent inside the OCR engine.
    pub ocr_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(page_index: usize, index: usize) -> ImageRef {
        ImageRef {
            page_index,
            index,
            file_path: PathBuf::from(format!("/out/doc_page{}_img{}.png", page_index + 1, index)),
            url: format!("/static/images/doc_page{}_img{}.png", page_index + 1, index),
            ext: "png".to_string(),
        }
    }

    #[test]
    fn markdown_link_is_1_indexed_with_alt_caption() {
        let link = image(0, 1).markdown_link();
        assert_eq!(link, "\n\n![Page 1 Image 1](/static/images/doc_page1_img1.png)\n");
    }

    #[test]
    fn image_urls_preserves_page_then_extraction_order() {
        let out = ExtractOutput {
            markdown: String::new(),
            pages: vec![
                PageResult {
                    page_num: 1,
                    text: String::new(),
                    ocr_applied: false,
                    images: vec![image(0, 1), image(0, 2)],
                    notes: vec![],
                },
                PageResult {
                    page_num: 2,
                    text: String::new(),
                    ocr_applied: false,
                    images: vec![image(1, 1)],
                    notes: vec![],
                },
            ],
            metadata: DocumentMetadata {
                title: None,
                author: None,
                subject: None,
                creator: None,
                producer: None,
                creation_date: None,
                modification_date: None,
                page_count: 2,
                pdf_version: "1.7".into(),
            },
            stats: ExtractStats::default(),
        };
        let urls = out.image_urls();
        assert_eq!(urls.len(), 3);
        assert!(urls[0].contains("page1_img1"));
        assert!(urls[1].contains("page1_img2"));
        assert!(urls[2].contains("page2_img1"));
    }

    #[test]
    fn blank_detection() {
        let mut p = PageResult {
            page_num: 1,
            text: String::new(),
            ocr_applied: false,
            images: vec![],
            notes: vec![],
        };
        assert!(p.is_blank());
        p.notes.push("[OCR error on page 1: boom]".into());
        assert!(!p.is_blank());
    }
}
