//! Configuration types for PDF extraction.
//!
//! All extraction behaviour is controlled through [`ExtractConfig`], built
//! via its [`ExtractConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across requests, serialise them for logging,
//! and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Character count below which a page's direct text is treated as "minimal"
/// and OCR is considered. Also drives the replace-vs-append merge decision
/// when OCR does run.
pub const MIN_TEXT_LEN_FOR_NO_OCR: usize = 50;

/// Configuration for one extraction run.
///
/// Built via [`ExtractConfig::builder()`] or [`ExtractConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfmd::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .image_dir("out/images")
///     .image_url_prefix("/static/images")
///     .force_ocr_pages([0, 2])
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Directory where extracted embedded images are written. Default:
    /// `pdfmd_images` under the current directory.
    ///
    /// Created (with parents) and probe-written at the start of each run;
    /// if that fails the run aborts before any page is touched.
    pub image_dir: PathBuf,

    /// Public URL prefix used in the emitted Markdown image links, e.g.
    /// `/static/images`. Default: `images`.
    ///
    /// Joined with `/` and the generated filename; never inspected further,
    /// so relative prefixes and absolute URLs both work.
    pub image_url_prefix: String,

    /// Force OCR on every page regardless of the direct-text heuristic.
    /// Default: false.
    pub force_ocr_all: bool,

    /// Explicit set of 0-indexed page numbers to force OCR on. Default: empty.
    ///
    /// Out-of-range entries are silently ignored — a forced page list built
    /// for a longer revision of the same document should not fail a run.
    pub force_ocr_pages: BTreeSet<usize>,

    /// Rasterisation DPI for OCR. Range: 72–600. Default: 300.
    ///
    /// 300 DPI is the resolution tesseract's models were trained around;
    /// lower values lose small print, higher ones cost memory for little
    /// accuracy gain.
    pub ocr_dpi: u32,

    /// OCR language passed to tesseract's `-l` flag. Default: "eng".
    pub ocr_language: String,

    /// Path or name of the tesseract executable. Default: "tesseract"
    /// (resolved via PATH).
    pub tesseract_cmd: PathBuf,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Progress callback invoked per page. Not serialised.
    #[serde(skip)]
    pub progress_callback: Option<crate::progress::ProgressCallback>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("pdfmd_images"),
            image_url_prefix: "images".to_string(),
            force_ocr_all: false,
            force_ocr_pages: BTreeSet::new(),
            ocr_dpi: 300,
            ocr_language: "eng".to_string(),
            tesseract_cmd: PathBuf::from("tesseract"),
            password: None,
            progress_callback: None,
        }
    }
}

impl std::fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("image_dir", &self.image_dir)
            .field("image_url_prefix", &self.image_url_prefix)
            .field("force_ocr_all", &self.force_ocr_all)
            .field("force_ocr_pages", &self.force_ocr_pages)
            .field("ocr_dpi", &self.ocr_dpi)
            .field("ocr_language", &self.ocr_language)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.image_dir = dir.into();
        self
    }

    pub fn image_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        // A trailing slash would double up when the filename is appended.
        let p = prefix.into();
        self.config.image_url_prefix = p.trim_end_matches('/').to_string();
        self
    }

    pub fn force_ocr_all(mut self, v: bool) -> Self {
        self.config.force_ocr_all = v;
        self
    }

    pub fn force_ocr_pages(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.config.force_ocr_pages = pages.into_iter().collect();
        self
    }

    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr_dpi = dpi.clamp(72, 600);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn progress_callback(mut self, cb: crate::progress::ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, ExtractError> {
        let c = &self.config;
        if c.ocr_dpi < 72 || c.ocr_dpi > 600 {
            return Err(ExtractError::InvalidConfig(format!(
                "OCR DPI must be 72–600, got {}",
                c.ocr_dpi
            )));
        }
        if c.ocr_language.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.image_url_prefix.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Image URL prefix must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
