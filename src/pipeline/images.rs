//! Embedded-image session: enumerate, decode, and save images per page.
//!
//! This stage opens the document with lopdf, independently of the pdfium
//! text session, and walks each page's `/Resources /XObject` table for
//! streams with `/Subtype /Image`. Raw stream bytes are written as-is when
//! the native encoding is already a file format (`DCTDecode` → JPEG,
//! `JPXDecode` → JPEG 2000); anything else is decompressed and re-encoded
//! as PNG from its raster samples.
//!
//! Failure isolation, tightest scope first: one undecodable image becomes
//! one bracketed note and its siblings still extract; a page whose object
//! table will not traverse becomes a single page note; a document lopdf
//! cannot open at all degrades every page to that note — the text layer
//! is never affected.

use crate::output::ImageRef;
use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, Stream};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One embedded image's raw bytes and native-format extension.
#[derive(Debug)]
struct EmbeddedImage {
    bytes: Vec<u8>,
    ext: &'static str,
}

/// The independent image-enumeration session, opened once per document.
pub struct ImageExtractor {
    doc: Option<Document>,
    open_error: Option<String>,
    page_ids: BTreeMap<u32, lopdf::ObjectId>,
    image_dir: PathBuf,
    url_prefix: String,
}

impl ImageExtractor {
    /// Open the document for image enumeration.
    ///
    /// Never fails: an unopenable document is recorded and every page
    /// extraction reports it as a page-level note instead, so text
    /// extraction proceeds regardless.
    pub fn open(pdf_path: &Path, image_dir: &Path, url_prefix: &str) -> Self {
        match Document::load(pdf_path) {
            Ok(doc) => {
                let page_ids = doc.get_pages();
                Self {
                    doc: Some(doc),
                    open_error: None,
                    page_ids,
                    image_dir: image_dir.to_path_buf(),
                    url_prefix: url_prefix.to_string(),
                }
            }
            Err(e) => {
                warn!("Image session could not open document: {e}");
                Self {
                    doc: None,
                    open_error: Some(e.to_string()),
                    page_ids: BTreeMap::new(),
                    image_dir: image_dir.to_path_buf(),
                    url_prefix: url_prefix.to_string(),
                }
            }
        }
    }

    /// Extract all embedded images on a page.
    ///
    /// Each element is either a saved [`ImageRef`] or the inline note that
    /// replaces it, in enumeration order. A page-level failure yields a
    /// single `Err` element.
    pub fn extract_page(&self, page_index: usize, base: &str) -> Vec<Result<ImageRef, String>> {
        let streams = match self.page_image_streams(page_index) {
            Ok(streams) => streams,
            Err(detail) => {
                return vec![Err(format!(
                    "\n[Error in image extraction for page {}: {}]\n",
                    page_index + 1,
                    detail
                ))];
            }
        };

        if !streams.is_empty() {
            info!(
                "Found {} images on page {}",
                streams.len(),
                page_index + 1
            );
        }

        streams
            .into_iter()
            .enumerate()
            .map(|(i, stream)| {
                let image_index = i + 1;
                self.save_image(page_index, image_index, base, stream)
                    .map_err(|detail| {
                        warn!(
                            "Error processing image {} on page {}: {}",
                            image_index,
                            page_index + 1,
                            detail
                        );
                        format!(
                            "\n[Error processing image {} on page {}: {}]\n",
                            image_index,
                            page_index + 1,
                            detail
                        )
                    })
            })
            .collect()
    }

    /// Collect the page's `/XObject` image streams in dictionary order.
    fn page_image_streams(&self, page_index: usize) -> Result<Vec<&Stream>, String> {
        let doc = match (&self.doc, &self.open_error) {
            (Some(doc), _) => doc,
            (None, Some(e)) => return Err(e.clone()),
            (None, None) => return Err("document not open".to_string()),
        };

        let page_id = self
            .page_ids
            .get(&(page_index as u32 + 1))
            .ok_or_else(|| format!("page {} not found", page_index + 1))?;

        let page_dict = doc
            .get_object(*page_id)
            .and_then(Object::as_dict)
            .map_err(|e| e.to_string())?;

        // No resources or no XObject table simply means no images.
        let Some(resources) = resolve_dict(doc, page_dict.get(b"Resources").ok()) else {
            return Ok(Vec::new());
        };
        let Some(xobjects) = resolve_dict(doc, resources.get(b"XObject").ok()) else {
            return Ok(Vec::new());
        };

        let mut streams = Vec::new();
        for (_name, obj) in xobjects.iter() {
            let Some(stream) = resolve_stream(doc, obj) else {
                continue;
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .map(|n| n == b"Image".as_slice())
                .unwrap_or(false);
            if is_image {
                streams.push(stream);
            }
        }
        Ok(streams)
    }

    /// Decode one image stream, write it to the image directory, verify
    /// the write, and return its reference.
    fn save_image(
        &self,
        page_index: usize,
        image_index: usize,
        base: &str,
        stream: &Stream,
    ) -> Result<ImageRef, String> {
        let embedded = decode_stream(stream)?;

        let filename = image_filename(base, page_index, image_index, embedded.ext);
        let save_path = self.image_dir.join(&filename);

        std::fs::write(&save_path, &embedded.bytes)
            .map_err(|e| format!("write failed: {e}"))?;

        // Verify the write landed; a zero-length or vanished file means a
        // broken link in the output, which is worse than an honest note.
        let size = std::fs::metadata(&save_path)
            .map(|m| m.len())
            .map_err(|e| format!("verification failed: {e}"))?;
        if size == 0 {
            return Err("verification failed: empty file".to_string());
        }
        debug!("Saved image {} ({} bytes)", filename, size);

        let url = format!("{}/{}", self.url_prefix, filename);
        Ok(ImageRef {
            page_index,
            index: image_index,
            file_path: save_path,
            url,
            ext: embedded.ext.to_string(),
        })
    }
}

/// Deterministic image filename: `{base}_page{P}_img{I}.{ext}`, both
/// indices 1-based.
pub fn image_filename(base: &str, page_index: usize, image_index: usize, ext: &str) -> String {
    format!("{}_page{}_img{}.{}", base, page_index + 1, image_index, ext)
}

/// Follow a reference (if any) to a dictionary.
fn resolve_dict<'a>(doc: &'a Document, obj: Option<&'a Object>) -> Option<&'a Dictionary> {
    match obj? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

/// Follow a reference (if any) to a stream.
fn resolve_stream<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Stream> {
    match obj {
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Stream(s) => Some(s),
            _ => None,
        },
        Object::Stream(s) => Some(s),
        _ => None,
    }
}

/// The stream's `/Filter` entry as a list of filter names.
fn filter_names(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(n)) => vec![n.clone()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok().map(|n| n.to_vec()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Turn an image stream into raw file bytes plus a native extension.
///
/// JPEG and JPEG 2000 payloads are already file formats and pass through
/// untouched. Everything else is decompressed and rebuilt as PNG from its
/// samples, which requires 8-bit DeviceRGB or DeviceGray — the encodings
/// that account for nearly all real-world embedded raster images.
fn decode_stream(stream: &Stream) -> Result<EmbeddedImage, String> {
    let filters = filter_names(stream);

    if filters.iter().any(|f| f == b"DCTDecode") {
        return Ok(EmbeddedImage {
            bytes: stream.content.clone(),
            ext: "jpg",
        });
    }
    if filters.iter().any(|f| f == b"JPXDecode") {
        return Ok(EmbeddedImage {
            bytes: stream.content.clone(),
            ext: "jp2",
        });
    }

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| format!("decompression failed: {e}"))?
    };

    let width = dict_u32(&stream.dict, b"Width")?;
    let height = dict_u32(&stream.dict, b"Height")?;
    let bits = dict_u32(&stream.dict, b"BitsPerComponent").unwrap_or(8);
    if bits != 8 {
        return Err(format!("unsupported bit depth: {bits}"));
    }

    let colorspace = stream
        .dict
        .get(b"ColorSpace")
        .and_then(Object::as_name)
        .map(|n| n.to_vec())
        .unwrap_or_default();

    let img: DynamicImage = match colorspace.as_slice() {
        b"DeviceRGB" => {
            let expected = width as usize * height as usize * 3;
            if data.len() < expected {
                return Err(format!(
                    "sample data too short: {} < {}",
                    data.len(),
                    expected
                ));
            }
            image::RgbImage::from_raw(width, height, data[..expected].to_vec())
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| "raster reconstruction failed".to_string())?
        }
        b"DeviceGray" => {
            let expected = width as usize * height as usize;
            if data.len() < expected {
                return Err(format!(
                    "sample data too short: {} < {}",
                    data.len(),
                    expected
                ));
            }
            image::GrayImage::from_raw(width, height, data[..expected].to_vec())
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| "raster reconstruction failed".to_string())?
        }
        other => {
            return Err(format!(
                "unsupported color space: {}",
                String::from_utf8_lossy(other)
            ));
        }
    };

    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .map_err(|e| format!("PNG encoding failed: {e}"))?;

    Ok(EmbeddedImage { bytes, ext: "png" })
}

/// A required positive integer entry from an image dictionary.
fn dict_u32(dict: &Dictionary, key: &[u8]) -> Result<u32, String> {
    let v = dict
        .get(key)
        .and_then(Object::as_i64)
        .map_err(|_| format!("missing {}", String::from_utf8_lossy(key)))?;
    if v <= 0 || v > u32::MAX as i64 {
        return Err(format!(
            "invalid {}: {v}",
            String::from_utf8_lossy(key)
        ));
    }
    Ok(v as u32)
}
